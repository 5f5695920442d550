//! Test fixtures for common types.

use arbiter_core::{MutationKind, OneTimeCode, ResourceKind, SensitiveAction, SensitiveToken};

/// A well-formed code the default mock accepts.
pub const VALID_CODE: &str = "123456";

/// A well-formed code, conventionally scripted as the wrong one.
pub const WRONG_CODE: &str = "000000";

/// Token value handed out by the default mock.
pub const TEST_TOKEN: &str = "tok_abc";

/// Create the default test token.
#[must_use]
pub fn test_token() -> SensitiveToken {
    SensitiveToken::new(TEST_TOKEN)
}

/// Parse [`VALID_CODE`].
#[must_use]
pub fn test_code() -> OneTimeCode {
    // VALID_CODE is six ASCII digits.
    match OneTimeCode::parse(VALID_CODE) {
        Ok(code) => code,
        Err(e) => unreachable!("fixture code is malformed: {e}"),
    }
}

/// Malformed code inputs the controller must reject locally.
#[must_use]
pub fn malformed_codes() -> Vec<&'static str> {
    vec![
        "", "1", "12", "12345", "1234567", "abcdef", "12a456", "12 456", "------", "１２３４５６",
    ]
}

/// A sensitive action descriptor for tests.
#[must_use]
pub fn test_action() -> SensitiveAction {
    SensitiveAction::new(ResourceKind::Role, MutationKind::Create)
}
