//! Bridge from `arbiter_config::Config` to runtime types.

use std::time::Duration;

use arbiter_api::ApiSettings;
use arbiter_config::Config;
use arbiter_telemetry::{LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = match cfg.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        _ => LogFormat::Compact,
    };

    let mut log_config = LogConfig::new(cfg.logging.level.to_ascii_lowercase()).with_format(format);

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}

/// Convert config to [`ApiSettings`].
pub(crate) fn to_api_settings(cfg: &Config) -> ApiSettings {
    ApiSettings::new(cfg.api.base_url.trim())
        .with_session_token(cfg.api.session_token.clone())
        .with_timeout(Duration::from_secs(cfg.api.timeout_secs))
        .with_sensitive_token_header(cfg.api.sensitive_token_header.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_from_defaults() {
        let mut cfg = Config::default();
        cfg.logging.format = "json".to_owned();
        cfg.logging.level = "DEBUG".to_owned();
        cfg.logging.directives = vec!["arbiter_api=trace".to_owned()];

        let lc = to_log_config(&cfg);
        assert_eq!(lc.level, "debug");
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.directives, vec!["arbiter_api=trace"]);
    }

    #[test]
    fn test_api_settings() {
        let mut cfg = Config::default();
        cfg.api.session_token = "sess-1".to_owned();
        cfg.api.timeout_secs = 30;

        let settings = to_api_settings(&cfg);
        assert_eq!(settings.base_url, "http://localhost:8000/api");
        assert_eq!(settings.session_token.as_deref(), Some("sess-1"));
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.sensitive_token_header, "X-Sensitive-Token");
    }

    #[test]
    fn test_blank_session_token_means_none() {
        let settings = to_api_settings(&Config::default());
        assert!(settings.session_token.is_none());
    }
}
