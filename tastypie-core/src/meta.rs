use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire names of the pagination fields inside `meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaKeys {
    pub limit: String,
    pub offset: String,
    pub total_count: String,
    pub next: String,
    pub previous: String,
}

impl Default for MetaKeys {
    fn default() -> Self {
        Self {
            limit: "limit".to_string(),
            offset: "offset".to_string(),
            total_count: "total_count".to_string(),
            next: "next".to_string(),
            previous: "previous".to_string(),
        }
    }
}

/// Pagination metadata of a collection response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl PageMeta {
    /// Reads the configured fields out of a `meta` object. `null` and
    /// unparseable values are treated as absent.
    pub fn from_wire(meta: &Map<String, Value>, keys: &MetaKeys) -> Self {
        Self {
            limit: meta.get(&keys.limit).and_then(as_count),
            offset: meta.get(&keys.offset).and_then(as_count),
            total_count: meta.get(&keys.total_count).and_then(as_count),
            next: meta.get(&keys.next).and_then(as_text),
            previous: meta.get(&keys.previous).and_then(as_text),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Offset to request the following page with, read from the `offset`
    /// query parameter of `next`.
    pub fn next_offset(&self) -> Option<u64> {
        let next = self.next.as_deref()?;
        next.split(['?', '&'])
            .filter_map(|pair| pair.strip_prefix("offset="))
            .find_map(|value| value.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
