//! Response extraction keyed by request kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ExtractError, NormalizeError};
use crate::meta::PageMeta;
use crate::record::{Record, Sideloaded, WireObject};
use crate::schema::EntityType;
use crate::serializer::Serializer;
use crate::store::Store;

/// The request a response payload answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestKind {
    Find,
    FindAll,
    FindMany,
    FindQuery,
    CreateRecord,
    UpdateRecord,
    DeleteRecord,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::Find,
        RequestKind::FindAll,
        RequestKind::FindMany,
        RequestKind::FindQuery,
        RequestKind::CreateRecord,
        RequestKind::UpdateRecord,
        RequestKind::DeleteRecord,
    ];
}

/// Primary records of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    Single(Record),
    Many(Vec<Record>),
    /// Saves may answer without a body.
    Empty,
}

impl Extracted {
    pub fn records(&self) -> &[Record] {
        match self {
            Extracted::Single(record) => std::slice::from_ref(record),
            Extracted::Many(records) => records,
            Extracted::Empty => &[],
        }
    }
}

/// Everything one response yields before it reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub primary: Extracted,
    pub sideloaded: Vec<Sideloaded>,
    pub meta: Option<PageMeta>,
}

type Handler = fn(&Serializer, &EntityType, WireObject) -> Result<Extraction, NormalizeError>;

/// Indexed by `RequestKind as usize`.
const HANDLERS: [(RequestKind, Handler); 7] = [
    (RequestKind::Find, extract_single as Handler),
    (RequestKind::FindAll, extract_array as Handler),
    (RequestKind::FindMany, extract_array as Handler),
    (RequestKind::FindQuery, extract_array as Handler),
    (RequestKind::CreateRecord, extract_save as Handler),
    (RequestKind::UpdateRecord, extract_save as Handler),
    (RequestKind::DeleteRecord, extract_save as Handler),
];

fn handler_for(kind: RequestKind) -> Handler {
    HANDLERS[kind as usize].1
}

fn extract_single(
    serializer: &Serializer,
    entity: &EntityType,
    payload: WireObject,
) -> Result<Extraction, NormalizeError> {
    let payload = unwrap_root(entity, payload);
    let normalized = serializer.normalizer().normalize(entity, payload)?;
    Ok(Extraction {
        primary: Extracted::Single(normalized.record),
        sideloaded: normalized.sideloaded,
        meta: None,
    })
}

fn extract_array(
    serializer: &Serializer,
    entity: &EntityType,
    payload: WireObject,
) -> Result<Extraction, NormalizeError> {
    let collection = serializer.normalizer().normalize_collection(entity, payload)?;
    Ok(Extraction {
        primary: Extracted::Many(collection.records),
        sideloaded: collection.sideloaded,
        meta: collection.meta,
    })
}

fn extract_save(
    serializer: &Serializer,
    entity: &EntityType,
    payload: WireObject,
) -> Result<Extraction, NormalizeError> {
    if payload.is_empty() {
        return Ok(Extraction {
            primary: Extracted::Empty,
            sideloaded: Vec::new(),
            meta: None,
        });
    }
    extract_single(serializer, entity, payload)
}

/// Accepts `{"<type>": {...}}` as well as a bare resource.
fn unwrap_root(entity: &EntityType, mut payload: WireObject) -> WireObject {
    if payload.len() == 1 {
        if let Some(Value::Object(_)) = payload.get(entity.name()) {
            if let Some(Value::Object(inner)) = payload.remove(entity.name()) {
                return inner;
            }
        }
    }
    payload
}

impl Serializer {
    /// Normalizes a response without touching any store.
    pub fn extraction(
        &self,
        kind: RequestKind,
        entity: &str,
        payload: Value,
    ) -> Result<Extraction, NormalizeError> {
        let entity = self.entity(entity)?;
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => WireObject::new(),
            _ => {
                return Err(NormalizeError::NotAnObject {
                    entity: entity.name().to_string(),
                });
            }
        };
        handler_for(kind)(self, entity, payload)
    }

    /// Normalizes a response and hands the result to `store`.
    ///
    /// Side-loaded records go first in a single batch, in discovery order,
    /// then collection metadata, then the primary records.
    #[instrument(skip_all, fields(entity = %entity, kind = ?kind))]
    pub fn extract<S: Store>(
        &self,
        store: &S,
        kind: RequestKind,
        entity: &str,
        payload: Value,
    ) -> Result<Extracted, ExtractError> {
        let Extraction {
            primary,
            sideloaded,
            meta,
        } = self.extraction(kind, entity, payload)?;

        debug!(sideloaded = sideloaded.len(), primary = primary.records().len(), "extracted payload");

        if !sideloaded.is_empty() {
            store.push_batch(sideloaded).map_err(store_error)?;
        }
        if let Some(meta) = meta {
            store.set_metadata(entity, meta).map_err(store_error)?;
        }

        let primary_batch = primary
            .records()
            .iter()
            .map(|record| Sideloaded {
                entity: entity.to_string(),
                record: record.clone(),
            })
            .collect::<Vec<_>>();
        if !primary_batch.is_empty() {
            store.push_batch(primary_batch).map_err(store_error)?;
        }

        Ok(primary)
    }
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(err: E) -> ExtractError {
    ExtractError::Store(Box::new(err))
}
