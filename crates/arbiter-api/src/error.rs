//! Admin API error types.

use arbiter_core::ConsoleError;
use arbiter_stepup::TransportError;
use thiserror::Error;

/// Errors that can occur talking to the admin API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL cannot address the API.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// A request could not be built (bad header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Local form validation failed; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ConsoleError),

    /// The request never completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A mutating request was refused because its sensitive token was
    /// missing, expired or already spent.
    #[error("sensitive token rejected: {message}")]
    SensitiveTokenRejected {
        /// Message extracted from the response body.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of the failure, when the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ApiError> for TransportError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } | ApiError::SensitiveTokenRejected { message } => {
                Self::Rejected { message }
            },
            ApiError::Http(e) => Self::Network(e.to_string()),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

/// Result type for admin API operations.
pub type ApiResult<T> = Result<T, ApiError>;
