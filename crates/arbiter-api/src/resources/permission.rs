use arbiter_core::{ConsoleError, ConsoleResult, ResourceKind};
use serde::{Deserialize, Serialize};

use super::{AdminResource, Payload, RecordId, max_chars, require};

const MAX_NAME_CHARS: usize = 64;
const MAX_CODE_CHARS: usize = 128;

/// A single permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Record id.
    pub id: RecordId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Machine-readable code checked by the backend, e.g. `problem:edit`.
    #[serde(default)]
    pub code: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

impl AdminResource for Permission {
    const KIND: ResourceKind = ResourceKind::Permission;
    type Payload = PermissionPayload;
}

/// Create/update form for a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionPayload {
    /// Display name.
    pub name: String,
    /// Machine-readable code.
    pub code: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PermissionPayload {
    /// A permission with no description.
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            description: None,
        }
    }

    /// Set the description; blank clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        let description = description.as_ref().trim();
        self.description = (!description.is_empty()).then(|| description.to_owned());
        self
    }
}

impl Payload for PermissionPayload {
    fn validate(&self) -> ConsoleResult<()> {
        require("name", &self.name)?;
        max_chars("name", &self.name, MAX_NAME_CHARS)?;
        require("code", &self.code)?;
        max_chars("code", &self.code, MAX_CODE_CHARS)?;

        let valid_code = self
            .code
            .trim()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'));
        if !valid_code {
            return Err(ConsoleError::invalid(
                "code",
                "only letters, digits and _ : . - are allowed",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_validation() {
        assert!(PermissionPayload::new("Edit problems", "problem:edit").validate().is_ok());
        assert!(PermissionPayload::new("", "problem:edit").validate().is_err());
        assert!(PermissionPayload::new("Edit", " ").validate().is_err());

        let err = PermissionPayload::new("Edit", "problem edit").validate().unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidField { field: "code", .. }));
    }
}
