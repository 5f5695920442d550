//! Admin collections: roles, permissions and users.
//!
//! Each collection lives at `{base}/admin/{collection}` and supports the same
//! four calls. Reads need only the session; every write needs a
//! [`SensitiveToken`], which the call consumes.

mod permission;
mod role;
mod user;

use std::marker::PhantomData;

use arbiter_core::{ConsoleResult, ResourceKind, SensitiveToken};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

pub use permission::{Permission, PermissionPayload};
pub use role::{Role, RolePayload};
pub use user::{User, UserPayload};

use crate::client::AdminClient;
use crate::error::{ApiError, ApiResult};
use crate::page::Page;
use crate::query::ListQuery;

/// Identifier of an admin record.
pub type RecordId = u64;

/// Form data sent on create and update.
pub trait Payload: Serialize + Send + Sync {
    /// Local field checks, run before any token is requested.
    ///
    /// # Errors
    ///
    /// Returns the first field that the backend would reject.
    fn validate(&self) -> ConsoleResult<()>;
}

/// A record type served by an admin collection.
pub trait AdminResource: DeserializeOwned + Send + Sync + 'static {
    /// Which collection serves this record.
    const KIND: ResourceKind;
    /// Form data for create and update.
    type Payload: Payload + 'static;
}

/// Typed handle on one admin collection.
pub struct ResourceClient<R> {
    client: AdminClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: AdminResource> std::fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &R::KIND)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// The roles collection.
    #[must_use]
    pub fn roles(&self) -> ResourceClient<Role> {
        ResourceClient::new(self.clone())
    }

    /// The permissions collection.
    #[must_use]
    pub fn permissions(&self) -> ResourceClient<Permission> {
        ResourceClient::new(self.clone())
    }

    /// The users collection.
    #[must_use]
    pub fn users(&self) -> ResourceClient<User> {
        ResourceClient::new(self.clone())
    }
}

impl<R: AdminResource> ResourceClient<R> {
    /// Handle on `R`'s collection.
    #[must_use]
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn collection_path() -> String {
        format!("admin/{}", R::KIND.collection())
    }

    fn record_path(id: RecordId) -> String {
        format!("admin/{}/{id}", R::KIND.collection())
    }

    /// Fetch one page of the collection.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the response is not a
    /// recognizable page.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<Page<R>> {
        let body = self
            .client
            .get_json(&Self::collection_path(), &query.to_pairs())
            .await?
            .ok_or_else(|| ApiError::Decode("empty list response".to_owned()))?;
        let page = Page::from_value(body)?;
        debug!(
            resource = %R::KIND,
            page = query.current_page(),
            rows = page.items.len(),
            total = page.total,
            "listed records"
        );
        Ok(page)
    }

    /// Create a record. Returns the stored record when the backend echoes it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] without sending anything if `payload`
    /// fails local validation, [`ApiError::SensitiveTokenRejected`] if the
    /// backend refuses the token, or another [`ApiError`] on failure.
    pub async fn create(&self, payload: &R::Payload, token: SensitiveToken) -> ApiResult<Option<R>> {
        payload.validate()?;
        let body = to_body(payload)?;
        let response = self
            .client
            .mutate(Method::POST, &Self::collection_path(), Some(&body), token)
            .await?;
        info!(resource = %R::KIND, "record created");
        decode_record(response)
    }

    /// Replace the fields of record `id`.
    ///
    /// # Errors
    ///
    /// Same as [`ResourceClient::create`], plus [`ApiError::Invalid`] for a
    /// zero id.
    pub async fn update(
        &self,
        id: RecordId,
        payload: &R::Payload,
        token: SensitiveToken,
    ) -> ApiResult<Option<R>> {
        check_id(id)?;
        payload.validate()?;
        let body = to_body(payload)?;
        let response = self
            .client
            .mutate(Method::PUT, &Self::record_path(id), Some(&body), token)
            .await?;
        info!(resource = %R::KIND, id, "record updated");
        decode_record(response)
    }

    /// Delete record `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for a zero id,
    /// [`ApiError::SensitiveTokenRejected`] if the backend refuses the token,
    /// or another [`ApiError`] on failure.
    pub async fn delete(&self, id: RecordId, token: SensitiveToken) -> ApiResult<()> {
        check_id(id)?;
        self.client
            .mutate(Method::DELETE, &Self::record_path(id), None, token)
            .await?;
        info!(resource = %R::KIND, id, "record deleted");
        Ok(())
    }
}

pub(crate) fn check_id(id: RecordId) -> ConsoleResult<()> {
    if id == 0 {
        return Err(arbiter_core::ConsoleError::InvalidId(
            "record ids start at 1".to_owned(),
        ));
    }
    Ok(())
}

fn to_body<P: Serialize>(payload: &P) -> ApiResult<Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

/// Decode a single record, unwrapping one `{"data": {...}}` envelope.
fn decode_record<R: DeserializeOwned>(response: Option<Value>) -> ApiResult<Option<R>> {
    let Some(mut value) = response else {
        return Ok(None);
    };
    if value.get("id").is_none() {
        match value.get_mut("data").map(Value::take) {
            Some(inner @ Value::Object(_)) => value = inner,
            // Acknowledgements like {"code": 0, "message": "ok"} carry no record.
            _ => return Ok(None),
        }
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ApiError::Decode(format!("record: {e}")))
}

/// Non-empty after trimming, else [`ConsoleError::MissingField`](arbiter_core::ConsoleError::MissingField).
pub(crate) fn require(field: &'static str, value: &str) -> ConsoleResult<()> {
    if value.trim().is_empty() {
        return Err(arbiter_core::ConsoleError::MissingField { field });
    }
    Ok(())
}

/// At most `max` characters.
pub(crate) fn max_chars(field: &'static str, value: &str, max: usize) -> ConsoleResult<()> {
    if value.trim().chars().count() > max {
        return Err(arbiter_core::ConsoleError::invalid(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::ApiSettings;

    fn client(server: &mockito::Server) -> AdminClient {
        AdminClient::new(&ApiSettings::new(server.url()).with_session_token("sess-1")).unwrap()
    }

    fn token() -> SensitiveToken {
        SensitiveToken::new("tok_abc")
    }

    #[test]
    fn test_decode_record_shapes() {
        let role: Option<Role> = decode_record(Some(json!({"id": 1, "name": "admin"}))).unwrap();
        assert_eq!(role.unwrap().name, "admin");

        let role: Option<Role> =
            decode_record(Some(json!({"data": {"id": 2, "name": "judge"}}))).unwrap();
        assert_eq!(role.unwrap().id, 2);

        let role: Option<Role> = decode_record(Some(json!({"code": 0, "message": "ok"}))).unwrap();
        assert!(role.is_none());
        assert!(decode_record::<Role>(None).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sends_query_and_normalizes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/admin/roles")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("page".into(), "2".into()),
                mockito::Matcher::UrlEncoded("page_size".into(), "10".into()),
                mockito::Matcher::UrlEncoded("keyword".into(), "admin".into()),
            ]))
            .match_header("authorization", "Bearer sess-1")
            .with_status(200)
            .with_body(r#"{"data":{"list":[{"id":1,"name":"admin"}],"total":11}}"#)
            .create_async()
            .await;

        let query = ListQuery::new().page(2).page_size(10).keyword(" admin ");
        let page = client(&server).roles().list(&query).await.unwrap();
        mock.assert_async().await;

        assert_eq!(page.total, 11);
        assert_eq!(page.items[0].name, "admin");
    }

    #[tokio::test]
    async fn test_create_attaches_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/permissions")
            .match_header("x-sensitive-token", "tok_abc")
            .match_header("x-request-id", mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(json!({"code": "problem:edit"})))
            .with_status(201)
            .with_body(r#"{"id":9,"name":"Edit problems","code":"problem:edit"}"#)
            .create_async()
            .await;

        let payload = PermissionPayload::new("Edit problems", "problem:edit");
        let created = client(&server)
            .permissions()
            .create(&payload, token())
            .await
            .unwrap()
            .unwrap();
        mock.assert_async().await;
        assert_eq!(created.id, 9);
    }

    #[tokio::test]
    async fn test_invalid_payload_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/roles")
            .expect(0)
            .create_async()
            .await;

        let err = client(&server)
            .roles()
            .create(&RolePayload::new("  "), token())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token_is_distinguished() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/admin/users/4")
            .with_status(403)
            .with_body(r#"{"detail":"sensitive token expired"}"#)
            .create_async()
            .await;

        let err = client(&server).users().delete(4, token()).await.unwrap_err();
        assert!(
            matches!(err, ApiError::SensitiveTokenRejected { ref message } if message == "sensitive token expired")
        );
    }

    #[tokio::test]
    async fn test_other_failures_keep_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/admin/roles/3")
            .with_status(409)
            .with_body(r#"{"message":"role name already exists"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .roles()
            .update(3, &RolePayload::new("judge"), token())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "HTTP 409: role name already exists");
    }

    #[tokio::test]
    async fn test_zero_id_is_invalid() {
        let server = mockito::Server::new_async().await;
        let err = client(&server).users().delete(0, token()).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Invalid(arbiter_core::ConsoleError::InvalidId(_))
        ));
    }
}
