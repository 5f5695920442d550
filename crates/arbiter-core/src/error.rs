//! Console error types.

use thiserror::Error;

/// Errors raised by local, client-side checks in the console.
///
/// These never involve the backend: they are produced before any request is
/// made, so the operator can fix the input and try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// A required form field was left empty.
    #[error("{field} is required")]
    MissingField {
        /// The field name
        field: &'static str,
    },

    /// A form field has a value the backend would reject.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// An identifier could not be used to address a resource.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl ConsoleError {
    /// Shorthand for [`ConsoleError::InvalidField`].
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
