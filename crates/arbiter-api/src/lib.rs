//! Arbiter API - HTTP client for the online-judge admin backend.
//!
//! This crate provides:
//! - [`AdminClient`]: session-authenticated client built from [`ApiSettings`]
//! - [`HttpChallengeTransport`]: the step-up `send`/`verify` endpoints as an
//!   [`arbiter_stepup::ChallengeTransport`]
//! - Typed [`ResourceClient`]s for roles, permissions and users, with
//!   [`ListQuery`] paging and [`Page`] normalization of the backend's
//!   inconsistent list envelopes
//! - [`ResourceMutation`]: a write packaged as an
//!   [`arbiter_stepup::GuardedAction`], so it validates locally, waits for a
//!   sensitive token and spends it on exactly one request

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod challenge;
pub mod client;
pub mod error;
pub mod mutation;
pub mod page;
pub mod query;
pub mod resources;

pub use challenge::HttpChallengeTransport;
pub use client::{AdminClient, ApiSettings, DEFAULT_SENSITIVE_TOKEN_HEADER, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use mutation::{Change, ResourceMutation};
pub use page::Page;
pub use query::{DEFAULT_PAGE_SIZE, ListQuery, MAX_PAGE_SIZE};
pub use resources::{
    AdminResource, Payload, Permission, PermissionPayload, RecordId, ResourceClient, Role,
    RolePayload, User, UserPayload,
};
