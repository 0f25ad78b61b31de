//! Resource URI convention: `/{namespace}/{resource}/{id}/`.

use serde::Deserialize;

use crate::error::UriError;

/// Builds a resource URI. An absent or empty id yields the collection URI.
pub fn build(namespace: &str, resource: &str, id: Option<&str>) -> String {
    let mut uri = String::from("/");
    for segment in [namespace.trim_matches('/'), resource, id.unwrap_or("")] {
        if !segment.is_empty() {
            uri.push_str(segment);
            uri.push('/');
        }
    }
    uri
}

/// Extracts the id from a resource URI.
///
/// Values without a `/` are returned unchanged, so this is safe to apply to
/// fields that may already hold a bare id. A URI missing its trailing slash
/// still yields its last segment; a value with no usable segment is
/// returned unchanged.
pub fn parse_id(value: &str) -> &str {
    if !value.contains('/') {
        return value;
    }
    last_segment(value).unwrap_or(value)
}

/// Like [`parse_id`], but rejects URIs without the mandatory trailing slash
/// and values with no usable segment.
pub fn parse_id_strict(value: &str) -> Result<&str, UriError> {
    if !value.contains('/') {
        return Ok(value);
    }
    if !value.ends_with('/') {
        return Err(UriError::MissingTrailingSlash(value.to_string()));
    }
    last_segment(value).ok_or_else(|| UriError::Malformed(value.to_string()))
}

/// True when the value looks like a resource URI rather than a bare id.
pub fn is_resource_uri(value: &str) -> bool {
    value.contains('/')
}

fn last_segment(value: &str) -> Option<&str> {
    let trimmed = value.strip_suffix('/').unwrap_or(value);
    trimmed.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// Namespace plus optional server domain used for every URI the adapter emits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UriCodec {
    host: Option<String>,
    namespace: String,
}

impl Default for UriCodec {
    fn default() -> Self {
        Self::new("api/v1")
    }
}

impl UriCodec {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            host: None,
            namespace: namespace.into(),
        }
    }

    /// Prepends a server domain (e.g. `http://localhost:8000/`) to request URLs.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Resource URI as embedded in payloads (never carries the host).
    pub fn resource_uri(&self, resource: &str, id: Option<&str>) -> String {
        build(&self.namespace, resource, id)
    }

    /// Request URL for one resource, or the collection when `id` is `None`.
    pub fn build_url(&self, resource: &str, id: Option<&str>) -> String {
        self.with_host_prefix(self.resource_uri(resource, id))
    }

    /// Request URL fetching several resources at once: `/{ns}/{resource}/set/1;2;3/`.
    pub fn build_many_url<I, S>(&self, resource: &str, ids: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(";");
        let path = format!("{}set/{}/", self.resource_uri(resource, None), joined);
        self.with_host_prefix(path)
    }

    fn with_host_prefix(&self, path: String) -> String {
        match self.host.as_deref() {
            Some(host) if !host.is_empty() => format!("{}{}", host.trim_end_matches('/'), path),
            _ => path,
        }
    }
}
