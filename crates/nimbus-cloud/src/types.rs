//! Shared wire types used across resource families

use serde::{Deserialize, Serialize};

/// A single metadata value attached to a resource.
///
/// The API accepts and returns scalar JSON values for metadata entries, so
/// this is a closed union over the scalar types rather than a free-form
/// `serde_json::Value`. Metadata supplied from `key=value` CLI flags is always
/// the `String` variant; servers may respond with any of the four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl MetadataValue {
    /// Returns the string content when this is the `String` variant
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Number(value.into())
    }
}

/// One page of a list response.
///
/// List endpoints return `{"count": N, "results": [...], "next": <url>|null}`;
/// `next` is an absolute URL to the following page and is absent on the last
/// one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
