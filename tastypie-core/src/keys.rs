//! Wire key resolution for attributes and relationships.

use convert_case::{Boundary, Case, Converter};
use serde::{Deserialize, Serialize};

use crate::config::AdapterConfig;
use crate::schema::RelationshipKind;

/// Naming transform applied to internal keys that have no explicit override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStyle {
    /// `firstName` -> `first_name`.
    #[default]
    Decamelize,
    /// Keys are sent exactly as declared.
    Preserve,
}

/// How a non-embedded reference is written on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStyle {
    /// `/api/v1/person/1/`
    #[default]
    ResourceUri,
    /// The bare id.
    Id,
}

/// Naming conventions shared by every entity type of one API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub key_style: KeyStyle,
    /// Appended to belongsTo wire keys; `None` or empty disables it.
    pub belongs_to_suffix: Option<String>,
    pub reference_style: ReferenceStyle,
    /// Appended to a polymorphic relationship's key to name its type field.
    pub polymorphic_type_suffix: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            key_style: KeyStyle::Decamelize,
            belongs_to_suffix: Some("_id".to_string()),
            reference_style: ReferenceStyle::ResourceUri,
            polymorphic_type_suffix: "Type".to_string(),
        }
    }
}

impl Dialect {
    /// Applies the naming transform, ignoring overrides and suffixes.
    pub fn transform(&self, key: &str) -> String {
        match self.key_style {
            KeyStyle::Decamelize => decamelize(key),
            KeyStyle::Preserve => key.to_string(),
        }
    }

    pub fn polymorphic_type_key(&self, key: &str) -> String {
        format!("{}{}", key, self.polymorphic_type_suffix)
    }

    fn suffix(&self) -> &str {
        self.belongs_to_suffix.as_deref().unwrap_or("")
    }
}

/// Field category a wire key is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Attribute,
    BelongsTo,
    HasMany,
}

impl From<RelationshipKind> for KeyKind {
    fn from(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::BelongsTo => KeyKind::BelongsTo,
            RelationshipKind::HasMany => KeyKind::HasMany,
        }
    }
}

/// Inserts `_` between a lowercase letter or digit and a following uppercase
/// letter, then lowercases everything.
pub fn decamelize(key: &str) -> String {
    Converter::new()
        .set_boundaries(&[Boundary::LowerUpper, Boundary::DigitUpper])
        .to_case(Case::Snake)
        .convert(key)
}

/// Resolves wire keys for one entity type's adapter config.
#[derive(Debug, Clone, Copy)]
pub struct KeyMapper<'a> {
    dialect: &'a Dialect,
    config: &'a AdapterConfig,
}

impl<'a> KeyMapper<'a> {
    pub fn new(dialect: &'a Dialect, config: &'a AdapterConfig) -> Self {
        Self { dialect, config }
    }

    /// Wire key for an internal attribute or relationship name.
    ///
    /// A declared override always wins.
    pub fn wire_key_for(&self, key: &str, kind: KeyKind) -> String {
        if let Some(custom) = self.config.key_for(key) {
            return custom.to_string();
        }

        let transformed = self.dialect.transform(key);
        match kind {
            KeyKind::BelongsTo => format!("{}{}", transformed, self.dialect.suffix()),
            KeyKind::Attribute | KeyKind::HasMany => transformed,
        }
    }

    /// Wire key of an embedded relationship: the override, or the
    /// attribute-style transform without a reference suffix.
    pub fn embedded_key_for(&self, key: &str) -> String {
        self.wire_key_for(key, KeyKind::Attribute)
    }

    /// True when the config declares an explicit wire key for `key`.
    pub fn is_declared(&self, key: &str) -> bool {
        self.config.key_for(key).is_some()
    }
}
