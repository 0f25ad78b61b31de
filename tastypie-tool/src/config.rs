use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tastypie_core::{AdapterConfig, ConfigRegistry, EntityType, Relationship, Schema, Serializer, Settings, UriCodec};
use tracing::debug;

use crate::error::TpieError;

const LOCAL_CONFIG: &str = "tastypie.toml";

/// Contents of a `tastypie.toml` file.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub adapter: UriCodec,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityConfig>,
}

/// One `[[entity]]` table: schema plus its field overrides.
#[derive(Debug, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub resource: Option<String>,
    pub primary_key: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub relationships: IndexMap<String, Relationship>,
    #[serde(default)]
    pub attrs: AdapterConfig,
}

impl EntityConfig {
    fn entity_type(&self) -> EntityType {
        let mut entity = EntityType::new(&self.name);
        if let Some(resource) = &self.resource {
            entity = entity.resource(resource);
        }
        if let Some(primary_key) = &self.primary_key {
            entity = entity.primary_key(primary_key);
        }
        for attribute in &self.attributes {
            entity = entity.attribute(attribute);
        }
        for (name, relationship) in &self.relationships {
            entity = entity.relationship(name, relationship.clone());
        }
        entity
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, TpieError> {
        Ok(toml::from_str(content)?)
    }

    /// Builds the serializer, rejecting duplicate entities and relationships
    /// that point at undeclared types.
    pub fn serializer(&self) -> Result<Serializer, TpieError> {
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(TpieError::DuplicateEntity(entity.name.clone()));
            }
        }
        for entity in &self.entities {
            for (field, relationship) in &entity.relationships {
                if !seen.contains(relationship.target.as_str()) {
                    return Err(TpieError::UnknownTarget {
                        entity: entity.name.clone(),
                        field: field.clone(),
                        target: relationship.target.clone(),
                    });
                }
            }
        }

        let mut schema = Schema::new();
        let mut configs = ConfigRegistry::new();
        for entity in &self.entities {
            schema.register(entity.entity_type());
            if !entity.attrs.is_empty() {
                configs = configs.with(&entity.name, entity.attrs.clone());
            }
        }

        Ok(Serializer::new(schema, self.adapter.clone())
            .with_configs(configs)
            .with_settings(self.settings.clone()))
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tastypie").join("config.toml"))
}

/// Loads the explicit path if given, else `./tastypie.toml`, else the user
/// config file. No file at all yields an empty config.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, TpieError> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return Config::parse(&std::fs::read_to_string(path)?);
    }

    let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG)).chain(config_path());
    for path in candidates {
        if let Ok(content) = std::fs::read_to_string(&path) {
            debug!(path = %path.display(), "loading config");
            return Config::parse(&content);
        }
    }

    debug!("no config file found, using defaults");
    Ok(Config::default())
}
