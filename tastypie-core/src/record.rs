use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One resource as transmitted.
pub type WireObject = Map<String, Value>;

/// One record in internal shape: relationships hold bare ids.
pub type Record = Map<String, Value>;

/// Reserved key carrying a resource's own URI.
pub const RESOURCE_URI_KEY: &str = "resource_uri";

/// Id of a normalized record as a string, if it has one.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A record discovered while unpacking embedded relationships.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sideloaded {
    pub entity: String,
    pub record: Record,
}

/// A record with its loaded relationships, as handed to the serializer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Concrete entity type name (may be a subtype of the relationship target).
    pub entity: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub belongs_to: IndexMap<String, Option<Box<Snapshot>>>,
    #[serde(default)]
    pub has_many: IndexMap<String, Vec<Snapshot>>,
}

impl Snapshot {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn belongs_to(mut self, name: impl Into<String>, related: Option<Snapshot>) -> Self {
        self.belongs_to.insert(name.into(), related.map(Box::new));
        self
    }

    pub fn has_many(mut self, name: impl Into<String>, related: Vec<Snapshot>) -> Self {
        self.has_many.insert(name.into(), related);
        self
    }

    pub fn related(&self, name: &str) -> Option<&Snapshot> {
        self.belongs_to.get(name).and_then(|r| r.as_deref())
    }

    pub fn related_many(&self, name: &str) -> &[Snapshot] {
        self.has_many.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}
