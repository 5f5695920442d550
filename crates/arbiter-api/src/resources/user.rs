use std::fmt;

use arbiter_core::{ConsoleError, ConsoleResult, ResourceKind};
use serde::{Deserialize, Serialize};

use super::{AdminResource, Payload, RecordId, require};

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=32;
const MIN_PASSWORD_CHARS: usize = 8;

fn default_active() -> bool {
    true
}

/// A console or judge account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Record id.
    pub id: RecordId,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Roles assigned to the account.
    #[serde(default, alias = "roles")]
    pub role_ids: Vec<RecordId>,
    /// Whether the account may sign in.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl AdminResource for User {
    const KIND: ResourceKind = ResourceKind::User;
    type Payload = UserPayload;
}

/// Create/update form for a user.
///
/// `password` is optional on update; leaving it unset keeps the current one.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserPayload {
    /// Login name.
    pub username: String,
    /// Contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Roles assigned to the account.
    pub role_ids: Vec<RecordId>,
    /// Whether the account may sign in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPayload {
    /// A user form with only the username set.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            password: None,
            role_ids: Vec::new(),
            is_active: None,
        }
    }

    /// Set the email; blank clears it.
    #[must_use]
    pub fn with_email(mut self, email: impl AsRef<str>) -> Self {
        let email = email.as_ref().trim();
        self.email = (!email.is_empty()).then(|| email.to_owned());
        self
    }

    /// Set a new password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Assign these roles.
    #[must_use]
    pub fn with_roles(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.role_ids = ids.into_iter().collect();
        self
    }

    /// Enable or disable sign-in.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }
}

impl fmt::Debug for UserPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPayload")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("role_ids", &self.role_ids)
            .field("is_active", &self.is_active)
            .finish()
    }
}

impl Payload for UserPayload {
    fn validate(&self) -> ConsoleResult<()> {
        require("username", &self.username)?;
        let username = self.username.trim();
        if !USERNAME_CHARS.contains(&username.chars().count()) {
            return Err(ConsoleError::invalid(
                "username",
                format!(
                    "must be {} to {} characters",
                    USERNAME_CHARS.start(),
                    USERNAME_CHARS.end()
                ),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(ConsoleError::invalid(
                "username",
                "only letters, digits and _ . - are allowed",
            ));
        }

        if let Some(ref email) = self.email {
            validate_email(email)?;
        }

        if self
            .password
            .as_ref()
            .is_some_and(|p| p.chars().count() < MIN_PASSWORD_CHARS)
        {
            return Err(ConsoleError::invalid(
                "password",
                format!("must be at least {MIN_PASSWORD_CHARS} characters"),
            ));
        }

        if self.role_ids.contains(&0) {
            return Err(ConsoleError::invalid("role_ids", "record ids start at 1"));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> ConsoleResult<()> {
    let shape_ok = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        },
        None => false,
    };
    if shape_ok {
        Ok(())
    } else {
        Err(ConsoleError::invalid("email", "not a valid address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let user: User = serde_json::from_str(r#"{"id": 1, "username": "alice"}"#).unwrap();
        assert!(user.is_active);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_username_rules() {
        assert!(UserPayload::new("alice_01").validate().is_ok());
        assert!(UserPayload::new("").validate().is_err());
        assert!(UserPayload::new("al").validate().is_err());
        assert!(UserPayload::new("alice smith").validate().is_err());
        assert!(UserPayload::new("a".repeat(33)).validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        let ok = |e: &str| UserPayload::new("alice").with_email(e).validate().is_ok();
        assert!(ok("alice@example.com"));
        assert!(ok("   "));
        assert!(!ok("alice"));
        assert!(!ok("@example.com"));
        assert!(!ok("alice@example"));
        assert!(!ok("alice@@example.com"));
    }

    #[test]
    fn test_password_length_and_redaction() {
        let payload = UserPayload::new("alice").with_password("short");
        assert!(matches!(
            payload.validate(),
            Err(ConsoleError::InvalidField { field: "password", .. })
        ));

        let payload = UserPayload::new("alice").with_password("correct horse");
        assert!(payload.validate().is_ok());
        assert!(!format!("{payload:?}").contains("correct horse"));
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let json = serde_json::to_value(UserPayload::new("alice")).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("is_active").is_none());
        assert_eq!(json["role_ids"], serde_json::json!([]));
    }
}
