//! Resources whose mutations are gated behind step-up authentication.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An administrative resource managed from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Roles grouping permissions.
    Role,
    /// Individual permission entries.
    Permission,
    /// Console and judge user accounts.
    User,
}

impl ResourceKind {
    /// Path segment of the resource collection on the admin API.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::Permission => "permissions",
            Self::User => "users",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role => write!(f, "role"),
            Self::Permission => write!(f, "permission"),
            Self::User => write!(f, "user"),
        }
    }
}

/// The kind of mutating call being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Create a new record.
    Create,
    /// Modify an existing record.
    Update,
    /// Remove a record.
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A mutating operation that the backend requires a sensitive token for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensitiveAction {
    /// What is being mutated.
    pub resource: ResourceKind,
    /// How it is being mutated.
    pub mutation: MutationKind,
}

impl SensitiveAction {
    /// Create a new sensitive action descriptor.
    #[must_use]
    pub fn new(resource: ResourceKind, mutation: MutationKind) -> Self {
        Self { resource, mutation }
    }
}

impl fmt::Display for SensitiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mutation, self.resource)
    }
}
