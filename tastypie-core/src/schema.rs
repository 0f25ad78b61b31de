use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primary key name used by internal records.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Kind of a relationship between two entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// Single reference.
    BelongsTo,
    /// Ordered collection of references.
    HasMany,
}

/// How a relationship travels on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Embedded {
    /// Resource URIs only.
    #[default]
    None,
    /// Nested objects are accepted when loading; references are sent back.
    Load,
    /// Nested objects both ways.
    Always,
}

impl Embedded {
    pub fn is_embedded(self) -> bool {
        matches!(self, Embedded::Load | Embedded::Always)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    /// Name of the related entity type.
    pub target: String,
    #[serde(default)]
    pub polymorphic: bool,
    /// Schema-level embedding; an adapter config entry overrides it.
    #[serde(default)]
    pub embedded: Embedded,
}

impl Relationship {
    pub fn belongs_to(target: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::BelongsTo,
            target: target.into(),
            polymorphic: false,
            embedded: Embedded::None,
        }
    }

    pub fn has_many(target: impl Into<String>) -> Self {
        Self {
            kind: RelationshipKind::HasMany,
            target: target.into(),
            polymorphic: false,
            embedded: Embedded::None,
        }
    }

    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }

    pub fn embedded(mut self, embedded: Embedded) -> Self {
        self.embedded = embedded;
        self
    }
}

/// Schema of one kind of record: ordered attributes plus ordered relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    resource: Option<String>,
    primary_key: String,
    attributes: Vec<String>,
    relationships: IndexMap<String, Relationship>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource: None,
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            attributes: Vec::new(),
            relationships: IndexMap::new(),
        }
    }

    /// Overrides the resource name used in URIs (defaults to the type name).
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.attributes.contains(&name) {
            self.attributes.push(name);
        }
        self
    }

    pub fn relationship(mut self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.relationships.insert(name.into(), relationship);
        self
    }

    pub fn belongs_to(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relationship(name, Relationship::belongs_to(target))
    }

    pub fn has_many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relationship(name, Relationship::has_many(target))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_name(&self) -> &str {
        self.resource.as_deref().unwrap_or(&self.name)
    }

    pub fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    pub fn relationships(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.relationships.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn get_relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }
}

/// Registry of entity types, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: HashMap<String, EntityType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, entity: EntityType) -> Self {
        self.register(entity);
        self
    }

    /// Registers an entity type, replacing any previous one with the same name.
    pub fn register(&mut self, entity: EntityType) {
        self.types.insert(entity.name.clone(), entity);
    }

    pub fn get(&self, name: &str) -> Option<&EntityType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
