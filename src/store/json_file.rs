//! Flat-file JSON backend: one pretty-printed array per collection
//! under the data directory (`appointments.json`, `messages.json`, ...).
//!
//! Every write rewrites the whole collection file. A single mutex
//! serializes writers, which also makes `append_unless` an atomic
//! check-then-insert (the booking conflict guard relies on this).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::{merge_patch, AppendOutcome, RecordStore, StoreError};

pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            collection: dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    fn read_collection(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            collection: collection.to_string(),
            source,
        })?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            collection: collection.to_string(),
            source,
        })
    }

    fn write_collection(&self, collection: &str, records: &[Value]) -> Result<(), StoreError> {
        let path = self.collection_path(collection);
        let data = serde_json::to_string_pretty(records)?;
        write_atomic(&path, data.as_bytes()).map_err(|source| StoreError::Io {
            collection: collection.to_string(),
            source,
        })
    }
}

/// Write via a sibling temp file + rename, so readers never observe a
/// half-written array.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

impl RecordStore for JsonFileStore {
    fn load_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.read_collection(collection)
    }

    fn append(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.read_collection(collection)?;
        records.push(record.clone());
        self.write_collection(collection, &records)?;
        Ok(record)
    }

    fn append_unless(
        &self,
        collection: &str,
        conflict: &dyn Fn(&Value) -> bool,
        record: Value,
    ) -> Result<AppendOutcome, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.read_collection(collection)?;
        if let Some(existing) = records.iter().find(|r| conflict(r)) {
            return Ok(AppendOutcome::Conflict(existing.clone()));
        }
        records.push(record.clone());
        self.write_collection(collection, &records)?;
        Ok(AppendOutcome::Appended(record))
    }

    fn update_where(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Value) -> bool,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut records = self.read_collection(collection)?;
        let updated = match records.iter_mut().find(|r| predicate(r)) {
            Some(record) => {
                merge_patch(record, patch);
                Some(record.clone())
            }
            None => None,
        };
        if updated.is_some() {
            self.write_collection(collection, &records)?;
        }
        Ok(updated)
    }
}
