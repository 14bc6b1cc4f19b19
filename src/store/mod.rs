//! Record store — durable append/update semantics over named collections.
//!
//! Each collection is an ordered list of JSON records. The trait is
//! object-safe (records cross it as `serde_json::Value`); the typed
//! [`Collection`] helper handles (de)serialization at the boundary.
//!
//! `append_unless` runs its conflict check and the insert as a single
//! step under the store's internal lock, so check-then-insert callers
//! (booking) cannot race each other.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Collection names used by the services.
pub const APPOINTMENTS: &str = "appointments";
pub const MESSAGES: &str = "messages";
pub const CONSULTATIONS: &str = "consultations";
pub const PATIENT_PROFILES: &str = "patient_profiles";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on collection {collection}: {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt collection {collection}: {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result of a conditional append.
#[derive(Debug, Clone)]
pub enum AppendOutcome {
    /// The record was appended.
    Appended(Value),
    /// An existing record matched the conflict predicate; nothing written.
    Conflict(Value),
}

/// Durable store over named collections of JSON records.
///
/// No transactions across collections; all reads observe a fully-formed
/// list (a missing collection reads as empty).
pub trait RecordStore: Send + Sync {
    /// All records of a collection, oldest first. Never fails on a
    /// collection that has never been written.
    fn load_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Append one record, rewriting the collection.
    fn append(&self, collection: &str, record: Value) -> Result<Value, StoreError>;

    /// Append unless an existing record matches `conflict`. Check and
    /// insert happen atomically with respect to other writers.
    fn append_unless(
        &self,
        collection: &str,
        conflict: &dyn Fn(&Value) -> bool,
        record: Value,
    ) -> Result<AppendOutcome, StoreError>;

    /// Merge `patch` onto the first record matching `predicate` and
    /// rewrite. Returns the updated record, or `None` when nothing
    /// matched. The merge is a shallow object merge.
    fn update_where(
        &self,
        collection: &str,
        predicate: &dyn Fn(&Value) -> bool,
        patch: Value,
    ) -> Result<Option<Value>, StoreError>;
}

/// Shallow object merge of `patch` onto `base`. Non-object inputs
/// leave `base` replaced by `patch`.
pub(crate) fn merge_patch(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (k, v) in patch_map {
                base_map.insert(k, v);
            }
        }
        (base_slot, patch_value) => *base_slot = patch_value,
    }
}

/// Typed view over one collection of a [`RecordStore`].
pub struct Collection<'a, T> {
    store: &'a dyn RecordStore,
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<'a, T> Collection<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: &'a dyn RecordStore, name: &'static str) -> Self {
        Self {
            store,
            name,
            _marker: PhantomData,
        }
    }

    pub fn load_all(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .load_all(self.name)?
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(StoreError::from))
            .collect()
    }

    /// Records passing `filter`, deserialized.
    pub fn find(&self, filter: impl Fn(&T) -> bool) -> Result<Vec<T>, StoreError> {
        Ok(self.load_all()?.into_iter().filter(|t| filter(t)).collect())
    }

    pub fn append(&self, record: &T) -> Result<T, StoreError> {
        let value = self.store.append(self.name, serde_json::to_value(record)?)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn append_unless(
        &self,
        conflict: impl Fn(&T) -> bool,
        record: &T,
    ) -> Result<TypedAppendOutcome<T>, StoreError> {
        let check = |v: &Value| -> bool {
            serde_json::from_value::<T>(v.clone())
                .map(|t| conflict(&t))
                .unwrap_or(false)
        };
        match self
            .store
            .append_unless(self.name, &check, serde_json::to_value(record)?)?
        {
            AppendOutcome::Appended(v) => Ok(TypedAppendOutcome::Appended(
                serde_json::from_value(v)?,
            )),
            AppendOutcome::Conflict(v) => Ok(TypedAppendOutcome::Conflict(
                serde_json::from_value(v)?,
            )),
        }
    }

    pub fn update_where(
        &self,
        predicate: impl Fn(&T) -> bool,
        patch: Value,
    ) -> Result<Option<T>, StoreError> {
        let check = |v: &Value| -> bool {
            serde_json::from_value::<T>(v.clone())
                .map(|t| predicate(&t))
                .unwrap_or(false)
        };
        match self.store.update_where(self.name, &check, patch)? {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }
}

/// Typed counterpart of [`AppendOutcome`].
#[derive(Debug)]
pub enum TypedAppendOutcome<T> {
    Appended(T),
    Conflict(T),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_patch_overwrites_and_keeps() {
        let mut base = json!({"a": 1, "b": "old"});
        merge_patch(&mut base, json!({"b": "new", "c": true}));
        assert_eq!(base, json!({"a": 1, "b": "new", "c": true}));
    }

    #[test]
    fn merge_patch_non_object_replaces() {
        let mut base = json!({"a": 1});
        merge_patch(&mut base, json!(42));
        assert_eq!(base, json!(42));
    }
}
