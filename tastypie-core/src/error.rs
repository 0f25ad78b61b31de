use thiserror::Error;

/// Errors raised by the strict resource URI parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("resource URI has no trailing slash: {0}")]
    MissingTrailingSlash(String),

    #[error("malformed resource URI: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("embedding depth {depth} exceeded while normalizing {entity}")]
    DepthExceeded { entity: String, depth: usize },

    #[error("malformed reference in {entity}.{field}: {value}")]
    MalformedReference {
        entity: String,
        field: String,
        value: serde_json::Value,
    },

    #[error("expected an object for {entity}")]
    NotAnObject { entity: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    #[error("embedding depth {depth} exceeded while serializing {entity}")]
    DepthExceeded { entity: String, depth: usize },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}
