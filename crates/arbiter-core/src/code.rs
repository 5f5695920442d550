//! One-time verification codes.
//!
//! A [`OneTimeCode`] is the short numeric code delivered to the operator's
//! second factor. It is checked locally before any network round trip, so a
//! malformed entry never reaches the backend.

use std::fmt;

use thiserror::Error;

/// Number of digits in a one-time code.
pub const CODE_LENGTH: usize = 6;

/// Local rejection of a malformed one-time code.
///
/// The display text is what the challenge dialog shows inline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeFormatError {
    /// Wrong number of characters.
    #[error("invalid format: the verification code must be {CODE_LENGTH} digits")]
    WrongLength {
        /// Length that was entered
        actual: usize,
    },

    /// Contains something other than ASCII digits.
    #[error("invalid format: the verification code may only contain digits")]
    NonNumeric,
}

/// A syntactically valid one-time code: exactly [`CODE_LENGTH`] ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OneTimeCode(String);

impl OneTimeCode {
    /// Parse operator input into a code.
    ///
    /// Surrounding whitespace is ignored; everything else must be digits.
    ///
    /// # Errors
    ///
    /// Returns [`CodeFormatError`] if the trimmed input is not exactly
    /// [`CODE_LENGTH`] ASCII digits.
    pub fn parse(input: &str) -> Result<Self, CodeFormatError> {
        let trimmed = input.trim();
        let actual = trimmed.chars().count();
        if actual != CODE_LENGTH {
            return Err(CodeFormatError::WrongLength { actual });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodeFormatError::NonNumeric);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are short-lived secrets; keep them out of logs.
impl fmt::Debug for OneTimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OneTimeCode(******)")
    }
}

impl std::str::FromStr for OneTimeCode {
    type Err = CodeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
