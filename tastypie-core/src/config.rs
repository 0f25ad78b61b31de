use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::keys::Dialect;
use crate::meta::MetaKeys;
use crate::schema::Embedded;

/// Per-field adapter options.
///
/// Deserializes either from a bare string (the wire key) or from a table
/// with `key` and `embedded`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawFieldConfig")]
pub struct FieldConfig {
    pub key: Option<String>,
    pub embedded: Option<Embedded>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldConfig {
    Key(String),
    Full {
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        embedded: Option<Embedded>,
    },
}

impl From<RawFieldConfig> for FieldConfig {
    fn from(raw: RawFieldConfig) -> Self {
        match raw {
            RawFieldConfig::Key(key) => FieldConfig {
                key: Some(key),
                embedded: None,
            },
            RawFieldConfig::Full { key, embedded } => FieldConfig { key, embedded },
        }
    }
}

/// Field mapping for one entity type: internal name -> wire options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AdapterConfig {
    attrs: IndexMap<String, FieldConfig>,
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an explicit wire key.
    pub fn key(mut self, field: impl Into<String>, wire_key: impl Into<String>) -> Self {
        self.attrs.entry(field.into()).or_default().key = Some(wire_key.into());
        self
    }

    pub fn embedded(mut self, field: impl Into<String>, embedded: Embedded) -> Self {
        self.attrs.entry(field.into()).or_default().embedded = Some(embedded);
        self
    }

    pub fn field(mut self, field: impl Into<String>, config: FieldConfig) -> Self {
        self.attrs.insert(field.into(), config);
        self
    }

    pub fn key_for(&self, field: &str) -> Option<&str> {
        self.attrs.get(field).and_then(|c| c.key.as_deref())
    }

    pub fn embedded_for(&self, field: &str) -> Option<Embedded> {
        self.attrs.get(field).and_then(|c| c.embedded)
    }

    /// `(internal key, wire key)` for every declared override, in declaration order.
    pub fn declared_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs
            .iter()
            .filter_map(|(field, c)| c.key.as_deref().map(|key| (field.as_str(), key)))
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Adapter configs keyed by entity type name.
///
/// Types without an entry resolve to an empty config, so default key rules apply.
#[derive(Debug, Clone, Default)]
pub struct ConfigRegistry {
    configs: HashMap<String, AdapterConfig>,
    fallback: AdapterConfig,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entity: impl Into<String>, config: AdapterConfig) -> Self {
        self.configs.insert(entity.into(), config);
        self
    }

    pub fn get(&self, entity: &str) -> &AdapterConfig {
        self.configs.get(entity).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.configs.contains_key(entity)
    }
}

/// How malformed references are treated while normalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Pass malformed values through untouched.
    #[default]
    Permissive,
    /// Fail with a `MalformedReference` error.
    Strict,
}

pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Adapter-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub dialect: Dialect,
    pub strictness: Strictness,
    /// Maximum embedding depth for normalize and serialize.
    pub max_depth: usize,
    pub meta_keys: MetaKeys,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            strictness: Strictness::Permissive,
            max_depth: DEFAULT_MAX_DEPTH,
            meta_keys: MetaKeys::default(),
        }
    }
}

impl Settings {
    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}
