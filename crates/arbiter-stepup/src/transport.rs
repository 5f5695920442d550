//! Backend side of the step-up challenge.

use arbiter_core::{OneTimeCode, SensitiveToken};
use async_trait::async_trait;
use thiserror::Error;

/// Why the backend did not hand out a token.
///
/// All variants reach the operator through the same inline error slot, so
/// `Display` is kept short and human-readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The backend refused the request (wrong code, expired, too many attempts).
    ///
    /// Displays the backend's message verbatim.
    #[error("{message}")]
    Rejected {
        /// Message from the backend
        message: String,
    },

    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with something we could not interpret.
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl TransportError {
    /// Shorthand for [`TransportError::Rejected`].
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Issues and validates one-time codes on behalf of the current session.
///
/// Implementations derive the operator's identity from their own session
/// credential; the controller never passes identity explicitly.
///
/// # Example
///
/// ```rust,ignore
/// use arbiter_stepup::{ChallengeTransport, TransportResult};
/// use arbiter_core::{OneTimeCode, SensitiveToken};
///
/// struct TotpTransport;
///
/// #[async_trait::async_trait]
/// impl ChallengeTransport for TotpTransport {
///     // Authenticator-app codes need no delivery step, so `issue` keeps its default.
///     async fn validate(&self, code: &OneTimeCode) -> TransportResult<SensitiveToken> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait ChallengeTransport: Send + Sync {
    /// Ask the backend to deliver a fresh code to the operator's second factor.
    ///
    /// Flows where the code is implicit (authenticator apps) keep the default,
    /// which does nothing.
    async fn issue(&self) -> TransportResult<()> {
        Ok(())
    }

    /// Exchange a code for a single-use sensitive token.
    async fn validate(&self, code: &OneTimeCode) -> TransportResult<SensitiveToken>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_backend_message() {
        let err = TransportError::rejected("验证码错误");
        assert_eq!(err.to_string(), "验证码错误");
    }

    #[test]
    fn test_other_variants_display() {
        assert_eq!(
            TransportError::Network("connection refused".to_string()).to_string(),
            "network error: connection refused"
        );
        assert_eq!(
            TransportError::Unexpected("missing token".to_string()).to_string(),
            "unexpected response: missing token"
        );
    }
}
