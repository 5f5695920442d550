//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbiter_api::prelude::*;` to import all essential types.

// Client
pub use crate::{AdminClient, ApiError, ApiResult, ApiSettings, HttpChallengeTransport};

// Collections
pub use crate::{ListQuery, Page, ResourceClient, ResourceMutation};

// Records and forms
pub use crate::{
    AdminResource, Payload, Permission, PermissionPayload, Role, RolePayload, User, UserPayload,
};
