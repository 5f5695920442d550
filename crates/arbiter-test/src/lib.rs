//! Arbiter Test - Shared test utilities for the Arbiter admin console.
//!
//! This crate provides mock implementations and test helpers that can be
//! used across multiple Arbiter crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! arbiter-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arbiter_stepup::SensitiveActionController;
//! use arbiter_test::{MockChallengeTransport, spawn_request, VALID_CODE};
//!
//! #[tokio::test]
//! async fn test_step_up() {
//!     let transport = MockChallengeTransport::new().accept_with("tok_abc");
//!     let controller = Arc::new(SensitiveActionController::new(Arc::new(transport)));
//!
//!     let pending = spawn_request(&controller).await;
//!     controller.set_code(VALID_CODE);
//!     controller.confirm().await;
//!
//!     assert!(pending.await.unwrap().is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
