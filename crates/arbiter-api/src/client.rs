//! Shared HTTP plumbing for the admin API.

use std::fmt;
use std::time::Duration;

use arbiter_core::SensitiveToken;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Header carrying the sensitive token unless configured otherwise.
pub const DEFAULT_SENSITIVE_TOKEN_HEADER: &str = "X-Sensitive-Token";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Header tagging mutating requests for log correlation.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// JSON fields the backend may put a human-readable error in, in order.
const MESSAGE_FIELDS: &[&str] = &["message", "msg", "error", "detail"];

/// Connection settings for [`AdminClient`].
#[derive(Clone)]
pub struct ApiSettings {
    /// Base URL of the admin API, including any path prefix.
    pub base_url: String,
    /// Bearer token of the logged-in operator.
    pub session_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Header name for the sensitive token on mutating requests.
    pub sensitive_token_header: String,
}

impl ApiSettings {
    /// Settings for `base_url` with default timeout and header, no session.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_token: None,
            timeout: DEFAULT_TIMEOUT,
            sensitive_token_header: DEFAULT_SENSITIVE_TOKEN_HEADER.to_owned(),
        }
    }

    /// Authenticate as the operator owning `token`.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.session_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the sensitive token header name.
    #[must_use]
    pub fn with_sensitive_token_header(mut self, header: impl Into<String>) -> Self {
        self.sensitive_token_header = header.into();
        self
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("has_session_token", &self.session_token.is_some())
            .field("timeout", &self.timeout)
            .field("sensitive_token_header", &self.sensitive_token_header)
            .finish()
    }
}

/// Client for the admin API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct AdminClient {
    http: Client,
    base: Url,
    session_token: Option<String>,
    token_header: HeaderName,
}

impl AdminClient {
    /// Build a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL is unusable, or
    /// [`ApiError::InvalidRequest`] if the token header name is invalid.
    pub fn new(settings: &ApiSettings) -> ApiResult<Self> {
        let mut base = Url::parse(settings.base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(settings.base_url.clone()));
        }
        // Url::join drops the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let token_header = HeaderName::from_bytes(settings.sensitive_token_header.trim().as_bytes())
            .map_err(|e| {
                ApiError::InvalidRequest(format!(
                    "sensitive token header '{}': {e}",
                    settings.sensitive_token_header
                ))
            })?;

        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            http,
            base,
            session_token: settings.session_token.clone(),
            token_header,
        })
    }

    /// The normalized base URL (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url);

        if let Some(ref session) = self.session_token {
            let mut auth_value = HeaderValue::try_from(format!("Bearer {session}"))
                .map_err(|e| ApiError::InvalidRequest(format!("invalid session token characters: {e}")))?;
            auth_value.set_sensitive(true);
            request = request.header(AUTHORIZATION, auth_value);
        }

        Ok(request)
    }

    /// `GET` a JSON document.
    pub(crate) async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<Option<Value>> {
        let request = self.request(Method::GET, path)?.query(query);
        self.execute(request, path, false).await
    }

    /// `POST` without a sensitive token (the step-up endpoints themselves).
    pub(crate) async fn post_json(&self, path: &str, body: Option<&Value>) -> ApiResult<Option<Value>> {
        let mut request = self.request(Method::POST, path)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, path, false).await
    }

    /// Send a mutating request carrying `token`.
    ///
    /// The token is consumed: whatever the outcome, it cannot be attached
    /// to another request.
    pub(crate) async fn mutate(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: SensitiveToken,
    ) -> ApiResult<Option<Value>> {
        let mut token_value = HeaderValue::try_from(token.into_inner())
            .map_err(|e| ApiError::InvalidRequest(format!("invalid sensitive token characters: {e}")))?;
        token_value.set_sensitive(true);

        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(method = %method, path, request_id = %request_id, "sending mutating request");

        let mut request = self
            .request(method, path)?
            .header(self.token_header.clone(), token_value)
            .header(REQUEST_ID_HEADER, request_id);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, path, true).await
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        path: &str,
        mutating: bool,
    ) -> ApiResult<Option<Value>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(status = %status, path, "admin API request failed");
            if mutating && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(ApiError::SensitiveTokenRejected { message });
            }
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }
}

impl fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminClient")
            .field("base", &self.base.as_str())
            .field("has_session_token", &self.session_token.is_some())
            .field("token_header", &self.token_header)
            .finish_non_exhaustive()
    }
}

/// Human-readable message for a failed response.
///
/// Prefers the backend's own message fields, falling back to the status text.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(body_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
        })
}

/// Human-readable message carried in a JSON response body, if any.
pub(crate) fn body_message(value: &Value) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| {
        value
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
    })
}
