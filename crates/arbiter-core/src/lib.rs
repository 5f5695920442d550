//! Arbiter Core - Foundation types for the Arbiter admin console.
//!
//! This crate provides:
//! - Error types for console operations
//! - The [`SensitiveToken`] credential and the [`OneTimeCode`] it is exchanged for
//! - Resource and mutation kinds for the screens gated behind step-up auth

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod code;
pub mod error;
pub mod resource;
pub mod token;

pub use code::{CODE_LENGTH, CodeFormatError, OneTimeCode};
pub use error::{ConsoleError, ConsoleResult};
pub use resource::{MutationKind, ResourceKind, SensitiveAction};
pub use token::SensitiveToken;
