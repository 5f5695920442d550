#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for the Arbiter admin console.
//!
//! # Usage
//!
//! ```rust,no_run
//! use arbiter_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("Admin API: {}", resolved.config.api.base_url);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **User file**: `--config <path>`, or the platform config dir
//!    (`~/.config/arbiter/config.toml` on Linux)
//! 2. **Environment variables** (`ARBITER_API_URL`, `ARBITER_SESSION_TOKEN`,
//!    `ARBITER_LOG_LEVEL`), fallback only
//! 3. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! # Design
//!
//! This crate has **no dependencies on other internal arbiter crates**.
//! Conversion into API settings and log config happens in the CLI.

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration from defaults, the user file and the process
    /// environment.
    ///
    /// `explicit` replaces user config discovery and must exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, &loader::collect_env_vars())
    }

    /// Load configuration with an explicit environment snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a config file is malformed or the final
    /// configuration fails validation.
    pub fn load_with_env(
        explicit: Option<&std::path::Path>,
        env_vars: &std::collections::HashMap<String, String>,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, env_vars)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
