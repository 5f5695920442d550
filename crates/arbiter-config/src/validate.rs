//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Digits in a one-time code. The backend issues six-digit codes only.
const SUPPORTED_CODE_LENGTH: usize = 6;

/// Upper bound for the request timeout (10 minutes).
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_api(config)?;
    validate_stepup(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_api(config: &Config) -> ConfigResult<()> {
    let api = &config.api;

    let url = url::Url::parse(api.base_url.trim())
        .map_err(|e| invalid("api.base_url", format!("'{}' is not a valid URL: {e}", api.base_url)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            "api.base_url",
            format!("unsupported scheme '{}'; expected http or https", url.scheme()),
        ));
    }

    if api.timeout_secs == 0 || api.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(invalid(
            "api.timeout_secs",
            format!(
                "timeout {} is out of range; must be between 1 and {MAX_TIMEOUT_SECS}",
                api.timeout_secs
            ),
        ));
    }

    let header = api.sensitive_token_header.trim();
    if header.is_empty() {
        return Err(invalid("api.sensitive_token_header", "must not be empty"));
    }
    if !header
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(invalid(
            "api.sensitive_token_header",
            format!("'{header}' is not a valid header name"),
        ));
    }

    Ok(())
}

fn validate_stepup(config: &Config) -> ConfigResult<()> {
    let s = &config.stepup;

    if s.code_length != SUPPORTED_CODE_LENGTH {
        return Err(invalid(
            "stepup.code_length",
            format!(
                "codes are {SUPPORTED_CODE_LENGTH} digits; {} is not supported",
                s.code_length
            ),
        ));
    }

    if s.max_attempts == 0 {
        return Err(invalid("stepup.max_attempts", "must be at least 1"));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.to_ascii_lowercase().as_str(),
        "error" | "warn" | "info" | "debug" | "trace"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: error, warn, info, debug, trace",
                l.level
            ),
        ));
    }

    if !matches!(l.format.as_str(), "pretty" | "compact" | "json") {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: pretty, compact, json",
                l.format
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut config = Config::default();
        config.api.base_url = "ftp://oj.example.com".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "api.base_url");

        config.api.base_url = "not a url".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "api.base_url");

        config.api.base_url = "https://oj.example.com/api/".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "api.timeout_secs");
        config.api.timeout_secs = MAX_TIMEOUT_SECS + 1;
        assert_eq!(field_of(validate(&config).unwrap_err()), "api.timeout_secs");
    }

    #[test]
    fn test_header_name() {
        let mut config = Config::default();
        config.api.sensitive_token_header = "  ".to_owned();
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "api.sensitive_token_header"
        );
        config.api.sensitive_token_header = "X Token".to_owned();
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "api.sensitive_token_header"
        );
    }

    #[test]
    fn test_code_length_fixed_at_six() {
        let mut config = Config::default();
        config.stepup.code_length = 4;
        assert_eq!(field_of(validate(&config).unwrap_err()), "stepup.code_length");
    }

    #[test]
    fn test_max_attempts_positive() {
        let mut config = Config::default();
        config.stepup.max_attempts = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "stepup.max_attempts");
    }

    #[test]
    fn test_logging_values() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "logging.level");

        config.logging.level = "DEBUG".to_owned();
        config.logging.format = "full".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "logging.format");
    }
}
