//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File path
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML or does not match the schema.
    #[error("failed to parse {path}: {source}")]
    ParseError {
        /// File path (or `<embedded defaults>` / `<merged config>`)
        path: String,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range or malformed.
    #[error("invalid value for {field}: {message}")]
    ValidationError {
        /// Dotted field path
        field: String,
        /// What is wrong
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
