//! Unbounded in-memory storage

use super::{AssetStorage, StoreEntry};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Stores every entry until it is removed or the storage is cleared
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Arc<StoreEntry>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetStorage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<Arc<StoreEntry>> {
        // Entries are immutable, so a poisoned lock still guards a consistent map
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn put(&self, key: &str, entry: StoreEntry) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            debug!("Storing entry {}", key);
            entries.insert(key.to_string(), Arc::new(entry));
        }
        entries.len()
    }

    fn update(&self, key: &str, entry: StoreEntry) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), Arc::new(entry));
        entries.len()
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
