use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use serde::Serialize;

use crate::meta::PageMeta;
use crate::record::{Record, Sideloaded, record_id};

/// Handle to a record pushed into a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordRef {
    pub entity: String,
    pub id: Option<String>,
}

/// The host's record store: identity map plus collection metadata.
///
/// Normalization never touches the store directly; extraction hands it the
/// records one batch at a time. All methods take `&self` so stores with
/// internal locking can be shared.
pub trait Store {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Inserts or replaces one record in the identity map.
    fn push(&self, entity: &str, record: Record) -> Result<RecordRef, Self::Error>;

    /// Pushes records in order. Called once per extraction for side-loaded records.
    fn push_batch(&self, records: Vec<Sideloaded>) -> Result<Vec<RecordRef>, Self::Error> {
        records
            .into_iter()
            .map(|Sideloaded { entity, record }| self.push(&entity, record))
            .collect()
    }

    /// Replaces the pagination metadata kept for an entity type.
    fn set_metadata(&self, entity: &str, meta: PageMeta) -> Result<(), Self::Error>;
}

impl<S: Store> Store for &S {
    type Error = S::Error;

    fn push(&self, entity: &str, record: Record) -> Result<RecordRef, Self::Error> {
        (*self).push(entity, record)
    }

    fn push_batch(&self, records: Vec<Sideloaded>) -> Result<Vec<RecordRef>, Self::Error> {
        (*self).push_batch(records)
    }

    fn set_metadata(&self, entity: &str, meta: PageMeta) -> Result<(), Self::Error> {
        (*self).set_metadata(entity, meta)
    }
}

/// An in-memory identity map.
///
/// Useful for testing and as a reference implementation. Records without an
/// id are kept in arrival order but cannot be looked up.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, IndexMap<String, Record>>>,
    unidentified: RwLock<Vec<(String, Record)>>,
    metadata: RwLock<HashMap<String, PageMeta>>,
    batches: RwLock<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &str, id: &str) -> Option<Record> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
            .and_then(|by_id| by_id.get(id))
            .cloned()
    }

    /// Ids of an entity type in first-push order.
    pub fn ids(&self, entity: &str) -> Vec<String> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
            .map(|by_id| by_id.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn metadata(&self, entity: &str) -> Option<PageMeta> {
        self.metadata
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
            .cloned()
    }

    /// Number of identified records across all entity types.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(IndexMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unidentified(&self) -> usize {
        self.unidentified.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of `push_batch` calls seen so far.
    pub fn batches(&self) -> usize {
        *self.batches.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    type Error = Infallible;

    fn push(&self, entity: &str, record: Record) -> Result<RecordRef, Self::Error> {
        let id = record_id(&record);
        match &id {
            Some(id) => {
                self.records
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(entity.to_string())
                    .or_default()
                    .insert(id.clone(), record);
            }
            None => self
                .unidentified
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push((entity.to_string(), record)),
        }
        Ok(RecordRef {
            entity: entity.to_string(),
            id,
        })
    }

    fn push_batch(&self, records: Vec<Sideloaded>) -> Result<Vec<RecordRef>, Self::Error> {
        *self.batches.write().unwrap_or_else(PoisonError::into_inner) += 1;
        records
            .into_iter()
            .map(|Sideloaded { entity, record }| self.push(&entity, record))
            .collect()
    }

    fn set_metadata(&self, entity: &str, meta: PageMeta) -> Result<(), Self::Error> {
        self.metadata
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entity.to_string(), meta);
        Ok(())
    }
}
