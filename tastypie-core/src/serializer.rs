use tracing::{debug, instrument};

use crate::config::{ConfigRegistry, Settings};
use crate::error::{NormalizeError, SerializeError};
use crate::keys::{KeyKind, KeyMapper};
use crate::normalize::{Normalized, NormalizedCollection, Normalizer};
use crate::record::{Snapshot, WireObject};
use crate::schema::{EntityType, Schema};
use crate::serialize::{Encoder, SerializeOptions};
use crate::uri::UriCodec;

/// Bidirectional transformer between tastypie payloads and internal records.
///
/// Holds everything read during a call: the schema, per-type adapter
/// configs, the URI codec and adapter-wide settings. All of it is immutable
/// once built, so a `Serializer` can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    schema: Schema,
    configs: ConfigRegistry,
    codec: UriCodec,
    settings: Settings,
}

impl Serializer {
    pub fn new(schema: Schema, codec: UriCodec) -> Self {
        Self {
            schema,
            configs: ConfigRegistry::default(),
            codec,
            settings: Settings::default(),
        }
    }

    pub fn with_configs(mut self, configs: ConfigRegistry) -> Self {
        self.configs = configs;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn configs(&self) -> &ConfigRegistry {
        &self.configs
    }

    pub fn codec(&self) -> &UriCodec {
        &self.codec
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn entity(&self, name: &str) -> Result<&EntityType, NormalizeError> {
        self.schema
            .get(name)
            .ok_or_else(|| NormalizeError::UnknownEntity(name.to_string()))
    }

    /// Wire key for an internal field of `entity`. Types without a config use
    /// the default rules.
    pub fn wire_key_for(&self, entity: &str, key: &str, kind: KeyKind) -> String {
        KeyMapper::new(&self.settings.dialect, self.configs.get(entity)).wire_key_for(key, kind)
    }

    /// Normalizes a single resource.
    #[instrument(skip_all, fields(entity = %entity))]
    pub fn normalize(&self, entity: &str, payload: WireObject) -> Result<Normalized, NormalizeError> {
        let entity = self.entity(entity)?;
        let normalized = self.normalizer().normalize(entity, payload)?;
        debug!(sideloaded = normalized.sideloaded.len(), "normalized resource");
        Ok(normalized)
    }

    /// Normalizes an `objects`/`meta` envelope, preserving server order.
    #[instrument(skip_all, fields(entity = %entity))]
    pub fn normalize_collection(
        &self,
        entity: &str,
        envelope: WireObject,
    ) -> Result<NormalizedCollection, NormalizeError> {
        let entity = self.entity(entity)?;
        let collection = self.normalizer().normalize_collection(entity, envelope)?;
        debug!(
            records = collection.records.len(),
            sideloaded = collection.sideloaded.len(),
            "normalized collection"
        );
        Ok(collection)
    }

    /// Serializes a snapshot into a new wire object.
    pub fn serialize(
        &self,
        snapshot: &Snapshot,
        options: SerializeOptions,
    ) -> Result<WireObject, SerializeError> {
        let mut json = WireObject::new();
        self.serialize_into(&mut json, snapshot, options)?;
        Ok(json)
    }

    /// Serializes a snapshot, merging its fields into `hash`.
    #[instrument(skip_all, fields(entity = %snapshot.entity))]
    pub fn serialize_into(
        &self,
        hash: &mut WireObject,
        snapshot: &Snapshot,
        options: SerializeOptions,
    ) -> Result<(), SerializeError> {
        let entity = self
            .schema
            .get(&snapshot.entity)
            .ok_or_else(|| SerializeError::UnknownEntity(snapshot.entity.clone()))?;
        self.encoder().serialize_into(hash, snapshot, entity, options)
    }

    /// Request URL for a record, or for the collection when `id` is `None`.
    pub fn build_url(&self, entity: &str, id: Option<&str>) -> String {
        self.codec.build_url(self.resource_name(entity), id)
    }

    /// Request URL fetching several records of one type at once.
    pub fn build_many_url<I, S>(&self, entity: &str, ids: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.codec.build_many_url(self.resource_name(entity), ids)
    }

    /// Unregistered types use their name as the resource name.
    fn resource_name<'s>(&'s self, entity: &'s str) -> &'s str {
        self.schema.get(entity).map_or(entity, EntityType::resource_name)
    }

    pub(crate) fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.schema, &self.configs, &self.settings)
    }

    fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.schema, &self.configs, &self.codec, &self.settings)
    }
}
