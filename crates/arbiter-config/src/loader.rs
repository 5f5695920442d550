//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the user config file (explicit path, or the platform config dir)
//! 3. Apply `ARBITER_*` env vars for fields no file set
//! 4. Deserialize merged tree → `Config`
//! 5. Validate

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Environment variables consulted as fallbacks, and the field each sets.
pub const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("ARBITER_API_URL", "api.base_url"),
    ("ARBITER_SESSION_TOKEN", "api.session_token"),
    ("ARBITER_LOG_LEVEL", "logging.level"),
];

/// A fully loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The validated configuration.
    pub config: Config,
    /// Config files that were found and merged, in order.
    pub loaded_files: Vec<String>,
    /// Fields filled in from environment variables.
    pub env_fields: Vec<String>,
}

/// Platform-specific location of the user config file
/// (e.g. `~/.config/arbiter/config.toml` on Linux).
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "arbiter", "arbiter")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("ARBITER_"))
        .collect()
}

/// Load configuration with layered precedence.
///
/// `explicit` replaces the user config discovery; unlike the discovered
/// file it must exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a config file is unreadable or malformed, or
/// if the final configuration fails validation.
pub fn load(
    explicit: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut loaded_files = Vec::new();
    let mut file_fields = HashSet::new();

    // 2. User config.
    let overlay = match explicit {
        Some(path) => Some((require_file(path)?, path.to_path_buf())),
        None => match user_config_path() {
            Some(path) => try_load_file(&path)?.map(|overlay| (overlay, path)),
            None => None,
        },
    };

    if let Some((overlay, path)) = overlay {
        collect_leaves(&overlay, "", &mut file_fields);
        deep_merge(&mut merged, &overlay);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded config file");
    }

    // 3. Env fallbacks for fields no file set.
    let env_fields = apply_env_fallbacks(&mut merged, &file_fields, env_vars);
    if !env_fields.is_empty() {
        debug!(count = env_fields.len(), "applied environment variable fallbacks");
    }

    // 4. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 5. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_files,
        env_fields,
    })
}

/// Load a config from a specific file path (no layering, no env).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = require_file(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Record the dotted path of every leaf in `val`.
fn collect_leaves(val: &toml::Value, prefix: &str, out: &mut HashSet<String>) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            collect_leaves(child, &path, out);
        }
    } else {
        out.insert(prefix.to_owned());
    }
}

fn apply_env_fallbacks(
    merged: &mut toml::Value,
    file_fields: &HashSet<String>,
    env_vars: &HashMap<String, String>,
) -> Vec<String> {
    let mut applied = Vec::new();
    for (var, field) in ENV_FALLBACKS {
        if file_fields.contains(*field) {
            continue;
        }
        let Some(value) = env_vars.get(*var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let Some((section, key)) = field.split_once('.') else {
            continue;
        };
        if let Some(table) = merged.get_mut(section).and_then(toml::Value::as_table_mut) {
            table.insert(key.to_owned(), toml::Value::String(value.clone()));
            applied.push((*field).to_owned());
        }
    }
    applied
}

fn require_file(path: &Path) -> ConfigResult<toml::Value> {
    try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
    })
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len(),
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}
