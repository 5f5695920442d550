use arbiter_core::{ConsoleResult, ResourceKind};
use serde::{Deserialize, Serialize};

use super::{AdminResource, Payload, RecordId, max_chars, require};

const MAX_NAME_CHARS: usize = 64;

/// A role grouping permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Record id.
    pub id: RecordId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Permissions granted by this role.
    #[serde(default, alias = "permissions")]
    pub permission_ids: Vec<RecordId>,
}

impl AdminResource for Role {
    const KIND: ResourceKind = ResourceKind::Role;
    type Payload = RolePayload;
}

/// Create/update form for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePayload {
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permissions granted by this role.
    pub permission_ids: Vec<RecordId>,
}

impl RolePayload {
    /// A role with no description or permissions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            permission_ids: Vec::new(),
        }
    }

    /// Set the description; blank clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        let description = description.as_ref().trim();
        self.description = (!description.is_empty()).then(|| description.to_owned());
        self
    }

    /// Grant these permissions.
    #[must_use]
    pub fn with_permissions(mut self, ids: impl IntoIterator<Item = RecordId>) -> Self {
        self.permission_ids = ids.into_iter().collect();
        self
    }
}

impl Payload for RolePayload {
    fn validate(&self) -> ConsoleResult<()> {
        require("name", &self.name)?;
        max_chars("name", &self.name, MAX_NAME_CHARS)?;
        if self.permission_ids.contains(&0) {
            return Err(arbiter_core::ConsoleError::invalid(
                "permission_ids",
                "record ids start at 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tolerates_missing_fields() {
        let role: Role = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(role.id, 3);
        assert!(role.name.is_empty());
        assert!(role.permission_ids.is_empty());

        let role: Role = serde_json::from_str(r#"{"id": 4, "permissions": [1, 2]}"#).unwrap();
        assert_eq!(role.permission_ids, vec![1, 2]);
    }

    #[test]
    fn test_payload_validation() {
        assert!(RolePayload::new("judge").validate().is_ok());
        assert!(RolePayload::new(" ").validate().is_err());
        assert!(RolePayload::new("x".repeat(65)).validate().is_err());
        assert!(
            RolePayload::new("judge")
                .with_permissions([1, 0])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_blank_description_is_omitted() {
        let payload = RolePayload::new("judge").with_description("  ");
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("description").is_none());
    }
}
