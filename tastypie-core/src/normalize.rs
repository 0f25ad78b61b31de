//! Wire payload -> internal records.

use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::config::{AdapterConfig, ConfigRegistry, Settings};
use crate::error::NormalizeError;
use crate::keys::{KeyKind, KeyMapper};
use crate::meta::PageMeta;
use crate::record::{RESOURCE_URI_KEY, Record, Sideloaded, WireObject};
use crate::schema::{DEFAULT_PRIMARY_KEY, Embedded, EntityType, Relationship, RelationshipKind, Schema};
use crate::uri;

/// Result of normalizing one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    pub record: Record,
    /// Embedded records, children before their parents.
    pub sideloaded: Vec<Sideloaded>,
}

/// Result of normalizing an `objects`/`meta` envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCollection {
    /// Primary records in server order.
    pub records: Vec<Record>,
    pub sideloaded: Vec<Sideloaded>,
    pub meta: Option<PageMeta>,
    /// Whatever the envelope carried besides `objects` and `meta`.
    pub remainder: WireObject,
}

pub(crate) struct Normalizer<'a> {
    schema: &'a Schema,
    configs: &'a ConfigRegistry,
    settings: &'a Settings,
}

impl<'a> Normalizer<'a> {
    pub(crate) fn new(schema: &'a Schema, configs: &'a ConfigRegistry, settings: &'a Settings) -> Self {
        Self {
            schema,
            configs,
            settings,
        }
    }

    pub(crate) fn normalize(
        &self,
        entity: &EntityType,
        hash: WireObject,
    ) -> Result<Normalized, NormalizeError> {
        let mut sideloaded = Vec::new();
        let record = self.normalize_at(entity, hash, 0, &mut sideloaded)?;
        Ok(Normalized { record, sideloaded })
    }

    pub(crate) fn normalize_collection(
        &self,
        entity: &EntityType,
        mut envelope: WireObject,
    ) -> Result<NormalizedCollection, NormalizeError> {
        let meta = match envelope.remove("meta") {
            Some(Value::Object(meta)) => Some(PageMeta::from_wire(&meta, &self.settings.meta_keys)),
            _ => None,
        };

        let mut records = Vec::new();
        let mut sideloaded = Vec::new();

        if let Some(objects) = envelope.remove("objects") {
            let items = match objects {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => vec![other],
            };
            for item in items {
                match item {
                    Value::Object(hash) => {
                        records.push(self.normalize_at(entity, hash, 0, &mut sideloaded)?);
                    }
                    other if self.settings.is_strict() => {
                        trace!(value = %other, "rejecting non-object collection member");
                        return Err(NormalizeError::NotAnObject {
                            entity: entity.name().to_string(),
                        });
                    }
                    other => warn!(entity = entity.name(), value = %other, "skipping non-object collection member"),
                }
            }
        }

        Ok(NormalizedCollection {
            records,
            sideloaded,
            meta,
            remainder: envelope,
        })
    }

    fn normalize_at(
        &self,
        entity: &EntityType,
        mut hash: WireObject,
        depth: usize,
        sideloaded: &mut Vec<Sideloaded>,
    ) -> Result<Record, NormalizeError> {
        if depth > self.settings.max_depth {
            return Err(NormalizeError::DepthExceeded {
                entity: entity.name().to_string(),
                depth,
            });
        }

        let config = self.configs.get(entity.name());
        let keys = KeyMapper::new(&self.settings.dialect, config);

        self.normalize_id(entity, &mut hash);
        normalize_using_declared_mapping(config, &mut hash);
        normalize_attributes(entity, &keys, &mut hash);
        self.extract_embedded(entity, &keys, &mut hash, depth, sideloaded)?;
        self.normalize_relationships(entity, &keys, &mut hash)?;

        Ok(hash)
    }

    fn normalize_id(&self, entity: &EntityType, hash: &mut WireObject) {
        let primary_key = entity.primary_key_name();
        if primary_key != DEFAULT_PRIMARY_KEY {
            rename(hash, primary_key, DEFAULT_PRIMARY_KEY);
        }

        if let Some(resource_uri) = hash.remove(RESOURCE_URI_KEY) {
            if hash.contains_key(DEFAULT_PRIMARY_KEY) {
                return;
            }
            if let Value::String(s) = &resource_uri {
                if uri::is_resource_uri(s) {
                    let id = uri::parse_id(s).to_string();
                    hash.insert(DEFAULT_PRIMARY_KEY.to_string(), Value::String(id));
                }
            }
        }
    }

    fn extract_embedded(
        &self,
        entity: &EntityType,
        keys: &KeyMapper<'_>,
        hash: &mut WireObject,
        depth: usize,
        sideloaded: &mut Vec<Sideloaded>,
    ) -> Result<(), NormalizeError> {
        let config = self.configs.get(entity.name());

        for (name, relationship) in entity.relationships() {
            let embedded = config.embedded_for(name).unwrap_or(relationship.embedded);
            if !embedded.is_embedded() {
                continue;
            }

            // A declared key was already moved under the internal name.
            let source = if keys.is_declared(name) {
                name.to_string()
            } else {
                keys.embedded_key_for(name)
            };
            let value = hash.remove(&source).or_else(|| hash.remove(name));

            let Some(value) = value else {
                if relationship.kind == RelationshipKind::HasMany {
                    hash.insert(name.to_string(), Value::Array(Vec::new()));
                }
                continue;
            };

            let target = self
                .schema
                .get(&relationship.target)
                .ok_or_else(|| NormalizeError::UnknownEntity(relationship.target.clone()))?;

            let normalized = match (relationship.kind, value) {
                (RelationshipKind::HasMany, Value::Array(items)) => {
                    let mut ids = Vec::with_capacity(items.len());
                    for item in items {
                        ids.push(self.unpack(entity, name, target, item, depth, sideloaded)?);
                    }
                    Value::Array(ids)
                }
                (RelationshipKind::HasMany, Value::Null) => Value::Array(Vec::new()),
                (RelationshipKind::HasMany, item) => {
                    Value::Array(vec![self.unpack(entity, name, target, item, depth, sideloaded)?])
                }
                (RelationshipKind::BelongsTo, item) => {
                    self.unpack(entity, name, target, item, depth, sideloaded)?
                }
            };
            hash.insert(name.to_string(), normalized);
        }

        Ok(())
    }

    /// Normalizes one embedded object into a side-loaded record and returns
    /// its id; anything that is not an object is treated as a reference.
    fn unpack(
        &self,
        entity: &EntityType,
        field: &str,
        target: &EntityType,
        value: Value,
        depth: usize,
        sideloaded: &mut Vec<Sideloaded>,
    ) -> Result<Value, NormalizeError> {
        match value {
            Value::Object(nested) => {
                let record = self.normalize_at(target, nested, depth + 1, sideloaded)?;
                let id = record.get(DEFAULT_PRIMARY_KEY).cloned().unwrap_or(Value::Null);
                trace!(entity = target.name(), id = %id, "side-loading embedded record");
                sideloaded.push(Sideloaded {
                    entity: target.name().to_string(),
                    record,
                });
                Ok(id)
            }
            other => self.resolve_reference(entity, field, other),
        }
    }

    fn normalize_relationships(
        &self,
        entity: &EntityType,
        keys: &KeyMapper<'_>,
        hash: &mut WireObject,
    ) -> Result<(), NormalizeError> {
        let config = self.configs.get(entity.name());

        for (name, relationship) in entity.relationships() {
            if is_embedded(config.embedded_for(name), relationship) {
                continue;
            }

            if !keys.is_declared(name) {
                let wire_key = keys.wire_key_for(name, KeyKind::from(relationship.kind));
                rename(hash, &wire_key, name);
            }

            match relationship.kind {
                RelationshipKind::BelongsTo => {
                    if let Some(value) = hash.get_mut(name) {
                        *value = self.resolve_reference(entity, name, value.take())?;
                    }
                }
                RelationshipKind::HasMany => match hash.get_mut(name) {
                    Some(Value::Array(items)) => {
                        for item in items.iter_mut() {
                            *item = self.resolve_reference(entity, name, item.take())?;
                        }
                    }
                    Some(value @ Value::Null) => {
                        *value = Value::Array(Vec::new());
                    }
                    // A lone reference still yields a list.
                    Some(value) => {
                        let id = self.resolve_reference(entity, name, value.take())?;
                        *value = Value::Array(vec![id]);
                    }
                    None => {
                        hash.insert(name.to_string(), Value::Array(Vec::new()));
                    }
                },
            }
        }

        Ok(())
    }

    /// Turns a resource URI into its id. Bare ids, `null` and polymorphic
    /// `{type, id}` objects are left alone; anything else is malformed.
    fn resolve_reference(
        &self,
        entity: &EntityType,
        field: &str,
        value: Value,
    ) -> Result<Value, NormalizeError> {
        match value {
            Value::String(s) if uri::is_resource_uri(&s) => {
                if self.settings.is_strict() {
                    match uri::parse_id_strict(&s) {
                        Ok(id) => Ok(Value::String(id.to_string())),
                        Err(_) => Err(malformed(entity, field, Value::String(s))),
                    }
                } else {
                    let id = uri::parse_id(&s);
                    if id == s {
                        warn!(entity = entity.name(), field, value = %s, "unresolvable resource URI");
                    }
                    Ok(Value::String(id.to_string()))
                }
            }
            value @ (Value::String(_) | Value::Number(_) | Value::Null | Value::Object(_)) => Ok(value),
            other if self.settings.is_strict() => Err(malformed(entity, field, other)),
            other => {
                warn!(entity = entity.name(), field, value = %other, "passing malformed reference through");
                Ok(other)
            }
        }
    }
}

fn is_embedded(configured: Option<Embedded>, relationship: &Relationship) -> bool {
    configured.unwrap_or(relationship.embedded).is_embedded()
}

fn normalize_using_declared_mapping(config: &AdapterConfig, hash: &mut WireObject) {
    for (field, wire_key) in config.declared_keys() {
        rename(hash, wire_key, field);
    }
}

fn normalize_attributes(entity: &EntityType, keys: &KeyMapper<'_>, hash: &mut WireObject) {
    for attribute in entity.attributes() {
        if keys.is_declared(attribute) {
            continue;
        }
        let wire_key = keys.wire_key_for(attribute, KeyKind::Attribute);
        rename(hash, &wire_key, attribute);
    }
}

/// Moves a value to a new key. A missing source leaves the target untouched.
fn rename(hash: &mut WireObject, from: &str, to: &str) {
    if from == to {
        return;
    }
    if let Some(value) = hash.remove(from) {
        hash.insert(to.to_string(), value);
    }
}

fn malformed(entity: &EntityType, field: &str, value: Value) -> NormalizeError {
    NormalizeError::MalformedReference {
        entity: entity.name().to_string(),
        field: field.to_string(),
        value,
    }
}
