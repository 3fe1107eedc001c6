//! Durable key/value storage for the distance cache and saved-quote ledger.
//!
//! Each logical key is one JSON document on disk. Callers treat every
//! failure here as best-effort: the in-memory copy stays authoritative.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::Mutex,
};

use thiserror::Error;
use tracing::debug;

pub const DISTANCE_CACHE_KEY: &str = "zip_distance_cache";
pub const SAVED_QUOTES_KEY: &str = "saved_quotes_v1";

const DATA_DIR_NAME: &str = "haulquote";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(target: "storage", path = %path.display(), "no stored document");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        fs::write(&path, value)?;
        debug!(target: "storage", path = %path.display(), bytes = value.len(), "stored document");
        Ok(())
    }
}

/// Process-local store; used when no data directory is available and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::StorageUnavailable)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::StorageUnavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|base| base.join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert!(store.read(SAVED_QUOTES_KEY).unwrap().is_none());
        store.write(SAVED_QUOTES_KEY, "[]").unwrap();
        assert_eq!(store.read(SAVED_QUOTES_KEY).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/saved_quotes_v1.json").exists());
    }

    #[test]
    fn file_store_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write(DISTANCE_CACHE_KEY, r#"{"90210-10001":2790}"#).unwrap();
        store.write(SAVED_QUOTES_KEY, "[]").unwrap();
        assert_eq!(
            store.read(DISTANCE_CACHE_KEY).unwrap().as_deref(),
            Some(r#"{"90210-10001":2790}"#)
        );
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemoryStore::new();
        store.write("k", "1").unwrap();
        store.write("k", "2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("2"));
        assert!(store.read("missing").unwrap().is_none());
    }
}
