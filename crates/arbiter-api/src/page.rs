//! Normalization of the backend's paginated response shapes.
//!
//! Different endpoints answer a list call with different envelopes:
//!
//! ```text
//! [ {...}, {...} ]
//! { "items": [...], "total": 42 }
//! { "list": [...], "count": 42 }
//! { "data": { "records": [...], "total_count": 42 } }
//! { "data": [...], "total": 42 }
//! ```
//!
//! [`Page::from_value`] accepts all of them.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

const ITEM_FIELDS: &[&str] = &["items", "list", "records", "rows"];
const TOTAL_FIELDS: &[&str] = &["total", "count", "total_count"];

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Total rows across all pages. Equals `items.len()` when the backend
    /// does not report a total.
    pub total: u64,
}

impl<T> Page<T> {
    /// Whether the page has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Normalize any supported envelope into a page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if no item list can be found or a row
    /// does not match `T`.
    pub fn from_value(value: Value) -> ApiResult<Self> {
        let (rows, total) = unwrap_envelope(value, true)?;
        let count = rows.len();
        let items = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| ApiError::Decode(format!("page row: {e}")))?;

        Ok(Self {
            items,
            total: total.unwrap_or(count as u64),
        })
    }
}

fn unwrap_envelope(value: Value, allow_nested: bool) -> ApiResult<(Vec<Value>, Option<u64>)> {
    let mut object = match value {
        Value::Array(rows) => return Ok((rows, None)),
        Value::Object(object) => object,
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list or page object, got {}",
                kind_of(&other)
            )));
        },
    };

    let total = TOTAL_FIELDS
        .iter()
        .find_map(|field| object.get(*field).and_then(as_total));

    if let Some(rows) = ITEM_FIELDS.iter().find_map(|field| match object.remove(*field) {
        Some(Value::Array(rows)) => Some(rows),
        _ => None,
    }) {
        return Ok((rows, total));
    }

    match object.remove("data") {
        Some(Value::Array(rows)) => Ok((rows, total)),
        Some(inner @ Value::Object(_)) if allow_nested => {
            let (rows, inner_total) = unwrap_envelope(inner, false)?;
            Ok((rows, inner_total.or(total)))
        },
        _ => Err(ApiError::Decode("page object has no item list".to_owned())),
    }
}

fn as_total(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
