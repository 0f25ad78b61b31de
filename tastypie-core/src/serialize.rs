//! Internal records -> wire payload.

use serde_json::Value;

use crate::config::{ConfigRegistry, Settings};
use crate::error::SerializeError;
use crate::keys::{KeyKind, KeyMapper, ReferenceStyle};
use crate::record::{Snapshot, WireObject};
use crate::schema::{Embedded, EntityType, Relationship, RelationshipKind, Schema};
use crate::uri::UriCodec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit the record's own primary key.
    pub include_id: bool,
}

impl SerializeOptions {
    pub fn with_id() -> Self {
        Self { include_id: true }
    }
}

pub(crate) struct Encoder<'a> {
    schema: &'a Schema,
    configs: &'a ConfigRegistry,
    codec: &'a UriCodec,
    settings: &'a Settings,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(
        schema: &'a Schema,
        configs: &'a ConfigRegistry,
        codec: &'a UriCodec,
        settings: &'a Settings,
    ) -> Self {
        Self {
            schema,
            configs,
            codec,
            settings,
        }
    }

    pub(crate) fn serialize_into(
        &self,
        json: &mut WireObject,
        snapshot: &Snapshot,
        entity: &EntityType,
        options: SerializeOptions,
    ) -> Result<(), SerializeError> {
        self.serialize_at(json, snapshot, entity, options, 0)
    }

    fn serialize_at(
        &self,
        json: &mut WireObject,
        snapshot: &Snapshot,
        entity: &EntityType,
        options: SerializeOptions,
        depth: usize,
    ) -> Result<(), SerializeError> {
        if depth > self.settings.max_depth {
            return Err(SerializeError::DepthExceeded {
                entity: entity.name().to_string(),
                depth,
            });
        }

        let config = self.configs.get(entity.name());
        let keys = KeyMapper::new(&self.settings.dialect, config);

        if options.include_id {
            if let Some(id) = &snapshot.id {
                json.insert(entity.primary_key_name().to_string(), Value::String(id.clone()));
            }
        }

        for attribute in entity.attributes() {
            let value = snapshot.attributes.get(attribute).cloned().unwrap_or(Value::Null);
            json.insert(keys.wire_key_for(attribute, KeyKind::Attribute), value);
        }

        for (name, relationship) in entity.relationships() {
            let embedded = config.embedded_for(name).unwrap_or(relationship.embedded);
            match relationship.kind {
                RelationshipKind::BelongsTo => {
                    self.serialize_belongs_to(json, snapshot, name, relationship, embedded, &keys, depth)?
                }
                RelationshipKind::HasMany => {
                    self.serialize_has_many(json, snapshot, name, relationship, embedded, &keys, depth)?
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn serialize_belongs_to(
        &self,
        json: &mut WireObject,
        snapshot: &Snapshot,
        name: &str,
        relationship: &Relationship,
        embedded: Embedded,
        keys: &KeyMapper<'_>,
        depth: usize,
    ) -> Result<(), SerializeError> {
        let related = snapshot.related(name);

        let value = match related {
            None => Value::Null,
            Some(related) if embedded == Embedded::Always => {
                Value::Object(self.embed(related, relationship, depth)?)
            }
            Some(related) => match &related.id {
                Some(id) => self.reference(relationship, id),
                None => Value::Null,
            },
        };

        let key = if embedded == Embedded::Always {
            keys.embedded_key_for(name)
        } else {
            keys.wire_key_for(name, KeyKind::BelongsTo)
        };
        json.insert(key, value);

        if relationship.polymorphic {
            let type_key = self.settings.dialect.polymorphic_type_key(name);
            let concrete = related.map_or(Value::Null, |r| Value::String(r.entity.clone()));
            json.insert(type_key, concrete);
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn serialize_has_many(
        &self,
        json: &mut WireObject,
        snapshot: &Snapshot,
        name: &str,
        relationship: &Relationship,
        embedded: Embedded,
        keys: &KeyMapper<'_>,
        depth: usize,
    ) -> Result<(), SerializeError> {
        let related = snapshot.related_many(name);

        let values = if embedded == Embedded::Always {
            related
                .iter()
                .map(|r| self.embed(r, relationship, depth).map(Value::Object))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            related
                .iter()
                .filter_map(|r| r.id.as_deref().map(|id| self.reference(relationship, id)))
                .collect()
        };

        json.insert(keys.wire_key_for(name, KeyKind::HasMany), Value::Array(values));
        Ok(())
    }

    fn embed(
        &self,
        related: &Snapshot,
        relationship: &Relationship,
        depth: usize,
    ) -> Result<WireObject, SerializeError> {
        let entity = self.related_entity(related, relationship)?;
        let mut data = WireObject::new();
        self.serialize_at(&mut data, related, entity, SerializeOptions::with_id(), depth + 1)?;
        Ok(data)
    }

    /// URIs name the declared target resource; a polymorphic record's
    /// concrete type travels in the separate type key.
    fn reference(&self, relationship: &Relationship, id: &str) -> Value {
        match self.settings.dialect.reference_style {
            ReferenceStyle::Id => Value::String(id.to_string()),
            ReferenceStyle::ResourceUri => {
                let resource = self
                    .schema
                    .get(&relationship.target)
                    .map_or(relationship.target.as_str(), EntityType::resource_name);
                Value::String(self.codec.resource_uri(resource, Some(id)))
            }
        }
    }

    /// The related record's own type if registered, else the relationship target.
    fn related_entity(
        &self,
        related: &Snapshot,
        relationship: &Relationship,
    ) -> Result<&'a EntityType, SerializeError> {
        self.schema
            .get(&related.entity)
            .or_else(|| self.schema.get(&relationship.target))
            .ok_or_else(|| SerializeError::UnknownEntity(relationship.target.clone()))
    }
}
