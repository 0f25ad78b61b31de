use thiserror::Error;

#[derive(Debug, Error)]
pub enum TpieError {
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Entity declared twice: {0}")]
    DuplicateEntity(String),

    #[error("Relationship {entity}.{field} targets unknown entity {target}")]
    UnknownTarget {
        entity: String,
        field: String,
        target: String,
    },

    #[error("Expected a JSON object as input")]
    NotAnObject,

    #[error("Unknown request kind: {0}")]
    UnknownRequestKind(String),

    #[error("Normalize error: {0}")]
    Normalize(#[from] tastypie_core::NormalizeError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] tastypie_core::SerializeError),
}
