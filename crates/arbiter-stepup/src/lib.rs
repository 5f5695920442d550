//! Arbiter Step-up - one-time-code confirmation for sensitive console actions.
//!
//! Mutating role, permission and user operations must carry a short-lived,
//! single-use [`SensitiveToken`]. This crate provides the reusable gate that
//! obtains one:
//!
//! - [`ChallengeTransport`]: the backend side (issue a code, validate a code)
//! - [`SensitiveActionController`]: owns the pending challenge, collects the
//!   operator's code and resolves every waiting caller with a token or `None`
//! - [`ChallengeState`]: observable snapshot a dialog (or terminal prompt)
//!   binds to via [`SensitiveActionController::subscribe`]
//! - [`gate`]: the contract calling screens follow (validate locally, request
//!   a token, spend it on exactly one request)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arbiter_stepup::{ChallengeTransport, SensitiveActionController};
//!
//! # async fn demo(transport: Arc<dyn ChallengeTransport>) {
//! let controller = Arc::new(SensitiveActionController::new(transport));
//!
//! // UI side: the operator types a code and presses confirm.
//! let ui = Arc::clone(&controller);
//! tokio::spawn(async move {
//!     ui.set_code("123456");
//!     ui.confirm().await;
//! });
//!
//! // Calling side: suspend until confirmed or cancelled.
//! match controller.request_token().await {
//!     Some(token) => { /* attach to exactly one mutating request */ },
//!     None => { /* operator cancelled, abort quietly */ },
//! }
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod controller;
pub mod gate;
pub mod state;
pub mod transport;

pub use arbiter_core::{OneTimeCode, SensitiveToken};
pub use controller::{ConfirmOutcome, SensitiveActionController};
pub use gate::{GateOutcome, GuardedAction, perform, with_token};
pub use state::{ChallengePhase, ChallengeState};
pub use transport::{ChallengeTransport, TransportError, TransportResult};
