//! In-memory record store, used by unit tests and as the reference
//! behavior for [`JsonFileStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{merge_patch, AppendOutcome, RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let guard = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }

    fn append(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        let mut guard = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        guard
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn append_unless(
        &self,
        collection: &str,
        conflict: &dyn Fn(&Value) -> bool,
        record: Value,
    ) -> Result<AppendOutcome, StoreError> {
        let mut guard = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        let records = guard.entry(collection.to_string()).or_default();
        if let Some(existing) = records.iter().find(|r| conflict(r)) {
            return Ok(AppendOutcome::Conflict(existing.clone()));
        }
        records.push(record.clone());
        Ok(AppendOutcome::Appended(record))
    }

    fn update_where(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Value) -> bool,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let mut guard = self.collections.lock().unwrap_or_else(|p| p.into_inner());
        let records = guard.entry(collection.to_string()).or_default();
        match records.iter_mut().find(|r| predicate(r)) {
            Some(record) => {
                merge_patch(record, patch);
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}
