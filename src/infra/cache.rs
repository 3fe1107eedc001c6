//! Two-tier ZIP-pair distance cache: a process-local map in front of a
//! durable JSON document.
//!
//! Entries never expire and are never evicted. Keys are directional, so a
//! cached `A -> B` distance is not reused for `B -> A`.

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ZipPair;
use crate::infra::storage::{KeyValueStore, StorageError, DISTANCE_CACHE_KEY};

pub trait DistanceCache {
    fn get(&mut self, pair: &ZipPair) -> Option<u32>;
    fn put(&mut self, pair: &ZipPair, miles: u32);
}

pub struct TieredDistanceCache {
    memory: HashMap<String, u32>,
    /// Parsed lazily on the first memory miss.
    durable: Option<HashMap<String, u32>>,
    /// Cleared when the durable document could not be read. Writing the
    /// partial map back would clobber entries this session never saw.
    durable_writable: bool,
    store: Arc<dyn KeyValueStore>,
}

impl TieredDistanceCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            memory: HashMap::new(),
            durable: None,
            durable_writable: true,
            store,
        }
    }

    /// Number of cached pairs. Every memory entry is mirrored in the durable
    /// map, so the durable map is the full set.
    pub fn len(&mut self) -> usize {
        self.durable_entries().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn durable_entries(&mut self) -> &mut HashMap<String, u32> {
        if self.durable.is_none() {
            let entries = match load_durable(self.store.as_ref()) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(target: "cache", error = %err, "failed to read distance cache, keeping it in memory this session");
                    self.durable_writable = false;
                    HashMap::new()
                }
            };
            self.durable = Some(entries);
        }
        self.durable.get_or_insert_with(HashMap::new)
    }

    fn persist(&mut self) {
        if !self.durable_writable {
            debug!(target: "cache", "durable tier unavailable, skipping write");
            return;
        }
        let snapshot = self.durable_entries().clone();
        let result = serde_json::to_string(&snapshot)
            .map_err(StorageError::from)
            .and_then(|json| self.store.write(DISTANCE_CACHE_KEY, &json));
        if let Err(err) = result {
            warn!(target: "cache", error = %err, "failed to persist distance cache");
        }
    }
}

impl DistanceCache for TieredDistanceCache {
    fn get(&mut self, pair: &ZipPair) -> Option<u32> {
        let key = pair.cache_key();
        if let Some(miles) = self.memory.get(&key) {
            debug!(target: "cache", %key, miles, "memory hit");
            return Some(*miles);
        }

        let miles = self.durable_entries().get(&key).copied()?;
        debug!(target: "cache", %key, miles, "durable hit, promoting");
        self.memory.insert(key, miles);
        Some(miles)
    }

    fn put(&mut self, pair: &ZipPair, miles: u32) {
        let key = pair.cache_key();
        self.memory.insert(key.clone(), miles);
        self.durable_entries().insert(key, miles);
        self.persist();
    }
}

/// A document that reads but does not parse is discarded and later
/// overwritten; only a failed read protects the stored document.
fn load_durable(store: &dyn KeyValueStore) -> Result<HashMap<String, u32>, StorageError> {
    let Some(raw) = store.read(DISTANCE_CACHE_KEY)? else {
        return Ok(HashMap::new());
    };

    let entries = match serde_json::from_str::<HashMap<String, Value>>(&raw) {
        Ok(entries) => entries
            .into_iter()
            .filter_map(|(key, value)| {
                let miles = value.as_u64().filter(|m| *m > 0)?;
                u32::try_from(miles).ok().map(|miles| (key, miles))
            })
            .collect(),
        Err(err) => {
            warn!(target: "cache", error = %err, "discarding unreadable distance cache");
            HashMap::new()
        }
    };
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::StorageUnavailable)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::StorageUnavailable)
        }
    }

    /// Holds a document but fails the first read.
    struct FlakyStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    impl KeyValueStore for FlakyStore {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(StorageError::StorageUnavailable);
            }
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.write(key, value)
        }
    }

    fn pair(origin: &str, destination: &str) -> ZipPair {
        ZipPair::parse(origin, destination).unwrap()
    }

    #[test]
    fn put_writes_through_to_durable_tier() {
        let store = Arc::new(MemoryStore::new());
        let mut cache = TieredDistanceCache::new(store.clone());
        cache.put(&pair("90210", "10001"), 2790);

        let raw = store.read(DISTANCE_CACHE_KEY).unwrap().unwrap();
        let parsed: HashMap<String, u32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.get("90210-10001"), Some(&2790));
    }

    #[test]
    fn durable_hit_survives_a_new_session() {
        let store = Arc::new(MemoryStore::new());
        TieredDistanceCache::new(store.clone()).put(&pair("90210", "10001"), 2790);

        let mut next_session = TieredDistanceCache::new(store);
        assert_eq!(next_session.get(&pair("90210", "10001")), Some(2790));
        assert!(next_session.memory.contains_key("90210-10001"));
    }

    #[test]
    fn reverse_direction_is_a_different_key() {
        let mut cache = TieredDistanceCache::new(Arc::new(MemoryStore::new()));
        cache.put(&pair("90210", "10001"), 2790);
        assert_eq!(cache.get(&pair("10001", "90210")), None);
    }

    #[test]
    fn ignores_non_numeric_durable_entries() {
        let store = Arc::new(MemoryStore::new());
        store
            .write(
                DISTANCE_CACHE_KEY,
                r#"{"90210-10001": 2790, "60601-73301": "far", "02108-33101": 0}"#,
            )
            .unwrap();
        let mut cache = TieredDistanceCache::new(store);

        assert_eq!(cache.get(&pair("90210", "10001")), Some(2790));
        assert_eq!(cache.get(&pair("60601", "73301")), None);
        assert_eq!(cache.get(&pair("02108", "33101")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn corrupt_durable_document_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.write(DISTANCE_CACHE_KEY, "{not json").unwrap();
        let mut cache = TieredDistanceCache::new(store.clone());

        assert!(cache.is_empty());
        cache.put(&pair("90210", "10001"), 2790);
        let raw = store.read(DISTANCE_CACHE_KEY).unwrap().unwrap();
        assert!(raw.contains("90210-10001"));
    }

    #[test]
    fn storage_failures_keep_memory_tier_working() {
        let mut cache = TieredDistanceCache::new(Arc::new(BrokenStore));
        assert_eq!(cache.get(&pair("90210", "10001")), None);
        cache.put(&pair("90210", "10001"), 2790);
        assert_eq!(cache.get(&pair("90210", "10001")), Some(2790));
    }

    #[test]
    fn failed_read_does_not_overwrite_stored_pairs() {
        let inner = MemoryStore::new();
        inner.write(DISTANCE_CACHE_KEY, r#"{"90210-10001":2790}"#).unwrap();
        let store = Arc::new(FlakyStore {
            inner,
            reads: AtomicUsize::new(0),
        });
        let mut cache = TieredDistanceCache::new(store.clone());

        cache.put(&pair("60601", "73301"), 1100);
        assert_eq!(cache.get(&pair("60601", "73301")), Some(1100));

        let raw = store.read(DISTANCE_CACHE_KEY).unwrap().unwrap();
        let parsed: HashMap<String, u32> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.get("90210-10001"), Some(&2790));
        assert!(!parsed.contains_key("60601-73301"));

        let mut next_session = TieredDistanceCache::new(store);
        assert_eq!(next_session.get(&pair("90210", "10001")), Some(2790));
    }
}
