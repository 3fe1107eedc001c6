//! Saved quotes, newest first, capped and mirrored to durable storage.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::SavedQuote;
use crate::infra::storage::{KeyValueStore, StorageError, SAVED_QUOTES_KEY};

pub const MAX_SAVED_QUOTES: usize = 50;

pub struct SavedQuoteLedger {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<SavedQuote>,
}

impl SavedQuoteLedger {
    /// Reads whatever survives from the last session. Unreadable documents
    /// and individual malformed entries are skipped.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut entries = read_entries(store.as_ref());
        entries.truncate(MAX_SAVED_QUOTES);
        debug!(target: "ledger", count = entries.len(), "loaded saved quotes");
        Self { store, entries }
    }

    pub fn list(&self) -> &[SavedQuote] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, quote: SavedQuote) {
        self.entries.insert(0, quote);
        self.entries.truncate(MAX_SAVED_QUOTES);
        self.persist();
    }

    /// Returns `false` if no entry had that id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|quote| quote.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(StorageError::from)
            .and_then(|json| self.store.write(SAVED_QUOTES_KEY, &json));
        if let Err(err) = result {
            warn!(target: "ledger", error = %err, "failed to persist saved quotes");
        }
    }
}

fn read_entries(store: &dyn KeyValueStore) -> Vec<SavedQuote> {
    let raw = match store.read(SAVED_QUOTES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(target: "ledger", error = %err, "failed to read saved quotes");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<Value>>(&raw) {
        Ok(values) => values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect(),
        Err(err) => {
            warn!(target: "ledger", error = %err, "discarding unreadable saved quotes");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{rate_estimate, PricingTable, QuoteDraft};
    use crate::infra::storage::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::StorageUnavailable)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::StorageUnavailable)
        }
    }

    fn quote(miles: &str) -> SavedQuote {
        let draft = QuoteDraft {
            origin_zip: "90210".into(),
            destination_zip: "10001".into(),
            distance_miles: miles.into(),
            ..QuoteDraft::default()
        };
        let input = draft.validate().unwrap();
        SavedQuote::new(&input, &rate_estimate(&input, &PricingTable::default()), false)
    }

    #[test]
    fn newest_first_and_capped() {
        let mut ledger = SavedQuoteLedger::load(Arc::new(MemoryStore::new()));
        for miles in 1..=51 {
            ledger.add(quote(&miles.to_string()));
        }
        assert_eq!(ledger.len(), MAX_SAVED_QUOTES);
        assert_eq!(ledger.list()[0].distance_miles, 51.0);
        // The very first quote was pushed out.
        assert_eq!(ledger.list()[MAX_SAVED_QUOTES - 1].distance_miles, 2.0);
    }

    #[test]
    fn survives_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut ledger = SavedQuoteLedger::load(store.clone());
        let first = quote("120");
        let second = quote("340");
        ledger.add(first.clone());
        ledger.add(second.clone());

        let reloaded = SavedQuoteLedger::load(store);
        assert_eq!(reloaded.list(), &[second, first]);
    }

    #[test]
    fn remove_by_id() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut ledger = SavedQuoteLedger::load(store.clone());
        let keep = quote("120");
        let drop_me = quote("340");
        ledger.add(keep.clone());
        ledger.add(drop_me.clone());

        assert!(ledger.remove(&drop_me.id));
        assert!(!ledger.remove(&drop_me.id));
        assert_eq!(SavedQuoteLedger::load(store).list(), &[keep]);
    }

    #[test]
    fn skips_malformed_entries() {
        let store = MemoryStore::new();
        let good = serde_json::to_value(quote("75")).unwrap();
        let doc = serde_json::json!([{"id": "broken"}, good, 42]);
        store.write(SAVED_QUOTES_KEY, &doc.to_string()).unwrap();

        let ledger = SavedQuoteLedger::load(Arc::new(store));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.list()[0].distance_miles, 75.0);
    }

    #[test]
    fn unreadable_document_starts_empty() {
        let store = MemoryStore::new();
        store.write(SAVED_QUOTES_KEY, "{not json").unwrap();
        assert!(SavedQuoteLedger::load(Arc::new(store)).is_empty());
    }

    #[test]
    fn broken_storage_keeps_memory_copy() {
        let mut ledger = SavedQuoteLedger::load(Arc::new(BrokenStore));
        ledger.add(quote("90"));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.remove(&ledger.list()[0].id.clone()));
    }
}
