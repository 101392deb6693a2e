//! Injected key-value persistence
//!
//! Collaborators (high scores, statistics, achievements, settings) store JSON
//! documents under fixed string keys. The simulation never touches storage.
//! Stored data that fails to parse is logged and replaced by its default.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised by a key-value backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation on '{key}' failed: {reason}")]
    Backend { key: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed storage with `localStorage` semantics
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Read a JSON document, falling back to `T::default()` when the key is
/// missing, the backend fails or the stored text does not parse.
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let json = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("Could not read '{}': {}", key, e);
            return T::default();
        }
    };

    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("Discarding corrupt '{}': {}", key, e);
        T::default()
    })
}

/// Serialize `value` and write it under `key`
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
