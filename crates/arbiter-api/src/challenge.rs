//! Step-up endpoints exposed as a [`ChallengeTransport`].

use arbiter_core::{OneTimeCode, SensitiveToken};
use arbiter_stepup::{ChallengeTransport, TransportError, TransportResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::{AdminClient, body_message};

const SEND_PATH: &str = "auth/sensitive/send";
const VERIFY_PATH: &str = "auth/sensitive/verify";

/// Where the backend may put the token in a verify response.
const TOKEN_FIELDS: &[&str] = &["token", "sensitive_token"];

/// Issues and validates one-time codes against the admin API.
#[derive(Debug, Clone)]
pub struct HttpChallengeTransport {
    client: AdminClient,
}

impl HttpChallengeTransport {
    /// Create a transport sharing `client`'s session and connection pool.
    #[must_use]
    pub fn new(client: AdminClient) -> Self {
        Self { client }
    }
}

impl AdminClient {
    /// Step-up transport bound to this client's session.
    #[must_use]
    pub fn challenge_transport(&self) -> HttpChallengeTransport {
        HttpChallengeTransport::new(self.clone())
    }
}

#[async_trait]
impl ChallengeTransport for HttpChallengeTransport {
    async fn issue(&self) -> TransportResult<()> {
        self.client.post_json(SEND_PATH, None).await?;
        debug!("one-time code issued");
        Ok(())
    }

    async fn validate(&self, code: &OneTimeCode) -> TransportResult<SensitiveToken> {
        let body = json!({ "code": code.as_str() });
        let response = self.client.post_json(VERIFY_PATH, Some(&body)).await?;

        let Some(response) = response else {
            return Err(TransportError::Unexpected(
                "response did not contain a token".to_owned(),
            ));
        };
        if let Some(token) = extract_token(&response) {
            return Ok(SensitiveToken::new(token));
        }

        // Some backends answer 200 with `{"code": 400, "message": ...}`.
        match body_message(&response) {
            Some(message) => {
                debug!(%message, "verify answered without a token");
                Err(TransportError::rejected(message))
            },
            None => Err(TransportError::Unexpected(
                "response did not contain a token".to_owned(),
            )),
        }
    }
}

fn extract_token(value: &Value) -> Option<String> {
    let find = |v: &Value| {
        TOKEN_FIELDS.iter().find_map(|field| {
            v.get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
        })
    };
    find(value).or_else(|| value.get("data").and_then(find))
}
