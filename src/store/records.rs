//! In-memory store for schema-less user records.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreError;

use super::ids::IdGenerator;

/// A user record: an arbitrary JSON object with a numeric `id` field.
pub type Record = serde_json::Map<String, Value>;

/// Name of the field holding a record's id.
pub const ID_FIELD: &str = "id";

/// Ordered, in-memory collection of records.
///
/// Every operation takes the lock once and finishes its whole
/// lookup-then-mutate sequence before releasing it, so concurrent requests
/// never observe or produce a half-applied change.
pub struct ResourceStore {
    records: RwLock<Vec<Record>>,
    ids: Arc<IdGenerator>,
}

impl ResourceStore {
    /// Create an empty store drawing ids from `ids`.
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            ids,
        }
    }

    /// All records in creation order.
    pub async fn list(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Store a new record under a fresh id and return it.
    ///
    /// Any `id` supplied by the caller is overwritten.
    pub async fn create(&self, mut fields: Record) -> Result<Record, StoreError> {
        let mut records = self.records.write().await;
        let id = self.ids.next_id().ok_or(StoreError::IdsExhausted)?;
        fields.insert(ID_FIELD.to_string(), Value::from(id));
        records.push(fields.clone());
        Ok(fields)
    }

    /// Replace the record with the given id by `fields`, wholesale.
    ///
    /// Fields missing from `fields` are dropped; the stored `id` stays `id`.
    pub async fn replace(&self, id: u64, mut fields: Record) -> Result<Record, StoreError> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|record| record_id(record) == Some(id))
            .ok_or_else(|| StoreError::RecordNotFound { id: id.to_string() })?;

        fields.insert(ID_FIELD.to_string(), Value::from(id));
        *slot = fields.clone();
        Ok(fields)
    }

    /// Remove the record whose id matches the textual `id`.
    ///
    /// The text is trimmed and parsed as an integer before comparison, so
    /// `"42"` and `" 42 "` both match a record with id `42`.
    pub async fn delete(&self, id: &str) -> Result<Record, StoreError> {
        let not_found = || StoreError::RecordNotFound { id: id.to_string() };
        let wanted: u64 = id.trim().parse().map_err(|_| not_found())?;

        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record_id(record) == Some(wanted))
            .ok_or_else(not_found)?;

        Ok(records.remove(index))
    }
}

/// Numeric id of a record, if it has one.
pub fn record_id(record: &Record) -> Option<u64> {
    record.get(ID_FIELD).and_then(Value::as_u64)
}
