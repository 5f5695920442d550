//! The single-use sensitive token.

use std::fmt;

/// Opaque credential issued after a one-time code is validated.
///
/// A token authorizes exactly one subsequent mutating request. Every API that
/// sends it takes it **by value**, and the type is not `Clone`:
/// once attached to a request the caller no longer holds it. Rebuilding a
/// token from [`SensitiveToken::expose`] sidesteps this and is the caller's
/// responsibility; the controller does so only to hand each waiter of one
/// challenge its own copy.
///
/// ```compile_fail
/// let token = arbiter_core::SensitiveToken::new("tok_abc");
/// let replay = token.clone();
/// ```
///
/// The value is never printed by `Debug`; use [`SensitiveToken::expose`] at
/// the point where it is written into a request.
#[derive(PartialEq, Eq)]
pub struct SensitiveToken(String);

impl SensitiveToken {
    /// Wrap a token string returned by the backend.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning the raw value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the backend handed back an empty token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SensitiveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SensitiveToken").field(&"<redacted>").finish()
    }
}
