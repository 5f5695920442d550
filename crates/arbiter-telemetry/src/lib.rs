//! Arbiter Telemetry - Logging for the Arbiter admin console.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats
//! - Integration with the tracing ecosystem
//!
//! # Example
//!
//! ```rust,no_run
//! use arbiter_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), arbiter_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("arbiter_stepup=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("console ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
