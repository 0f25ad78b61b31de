//! Payload translation between a django-tastypie REST API and a client-side
//! record store.
//!
//! Core concepts:
//! - **Schema**: entity types with ordered attributes and relationships
//! - **AdapterConfig**: per-type wire key overrides and embedding modes
//! - **UriCodec**: builds and parses resource URIs like `/api/v1/person/1/`
//! - **Serializer**: normalizes responses into flat records and serializes
//!   snapshots back into request bodies
//! - **Store**: the identity map extracted records are pushed into
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tastypie_core::{EntityType, Schema, Serializer, UriCodec};
//!
//! let schema = Schema::new()
//!     .with(EntityType::new("person").attribute("firstName"))
//!     .with(EntityType::new("task").attribute("name").belongs_to("owner", "person"));
//! let serializer = Serializer::new(schema, UriCodec::new("api/v1"));
//!
//! let payload = json!({
//!     "name": "Get a bike!",
//!     "owner_id": "/api/v1/person/1/",
//!     "resource_uri": "/api/v1/task/4/"
//! });
//! let normalized = serializer
//!     .normalize("task", payload.as_object().cloned().unwrap_or_default())
//!     .unwrap();
//!
//! assert_eq!(normalized.record["id"], json!("4"));
//! assert_eq!(normalized.record["owner"], json!("1"));
//! ```
//!
//! # Embedding
//!
//! Relationships marked `load` or `always` accept nested objects. Each
//! nested object is normalized recursively and side-loaded; the parent keeps
//! only the ids. Side-loaded records come out children first, so a store
//! that links records on insert always sees the target before the reference.

mod config;
mod error;
mod extract;
mod keys;
mod meta;
mod normalize;
mod record;
mod schema;
mod serialize;
mod serializer;
mod store;
pub mod uri;

pub use config::{AdapterConfig, ConfigRegistry, DEFAULT_MAX_DEPTH, FieldConfig, Settings, Strictness};
pub use error::{ExtractError, NormalizeError, SerializeError, UriError};
pub use extract::{Extracted, Extraction, RequestKind};
pub use keys::{Dialect, KeyKind, KeyMapper, KeyStyle, ReferenceStyle, decamelize};
pub use meta::{MetaKeys, PageMeta};
pub use normalize::{Normalized, NormalizedCollection};
pub use record::{RESOURCE_URI_KEY, Record, Sideloaded, Snapshot, WireObject, record_id};
pub use schema::{DEFAULT_PRIMARY_KEY, Embedded, EntityType, Relationship, RelationshipKind, Schema};
pub use serialize::SerializeOptions;
pub use serializer::Serializer;
pub use store::{MemoryStore, RecordRef, Store};
pub use uri::UriCodec;
