//! Configuration types for the Arbiter console.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working setup.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Admin backend endpoint and credentials.
    pub api: ApiSection,
    /// Step-up verification prompt behaviour.
    pub stepup: StepupSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// ApiSection
// ---------------------------------------------------------------------------

/// Where the admin API lives and how to authenticate to it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the admin API, including any path prefix.
    pub base_url: String,
    /// Session bearer token of the logged-in operator. Prefer
    /// `ARBITER_SESSION_TOKEN` over storing it in a file.
    pub session_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Header carrying the sensitive token on mutating requests.
    pub sensitive_token_header: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_owned(),
            session_token: String::new(),
            timeout_secs: 15,
            sensitive_token_header: "X-Sensitive-Token".to_owned(),
        }
    }
}

impl ApiSection {
    /// Whether a session token has been configured.
    #[must_use]
    pub fn has_session_token(&self) -> bool {
        !self.session_token.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSection")
            .field("base_url", &self.base_url)
            .field("has_session_token", &self.has_session_token())
            .field("timeout_secs", &self.timeout_secs)
            .field("sensitive_token_header", &self.sensitive_token_header)
            .finish()
    }
}

// The session token never leaves the process through `config show`.
impl Serialize for ApiSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiSection", 3)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.serialize_field("sensitive_token_header", &self.sensitive_token_header)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// StepupSection
// ---------------------------------------------------------------------------

/// Step-up verification prompt behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StepupSection {
    /// Expected number of digits in a one-time code. Codes are always
    /// validated as six digits; any other value is rejected at load time.
    pub code_length: usize,
    /// How many codes the terminal prompt asks for before giving up and
    /// cancelling the challenge.
    pub max_attempts: u32,
}

impl Default for StepupSection {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_attempts: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Output format: `pretty`, `compact` or `json`.
    pub format: String,
    /// Extra `target=level` directives.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
