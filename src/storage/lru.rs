//! Size-bounded in-memory storage evicting the least recently used entry

use super::{AssetStorage, StoreEntry};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct LruState {
    entries: HashMap<String, (Arc<StoreEntry>, u64)>,
    tick: u64,
}

impl LruState {
    fn touch(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_to(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    debug!("Evicting entry {}", key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

/// Keeps at most `capacity` entries
#[derive(Debug)]
pub struct LruStorage {
    capacity: usize,
    state: Mutex<LruState>,
}

impl LruStorage {
    /// Create a storage holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(LruState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl AssetStorage for LruStorage {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn get(&self, key: &str) -> Option<Arc<StoreEntry>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let tick = state.touch();
        state.entries.get_mut(key).map(|(entry, used)| {
            *used = tick;
            Arc::clone(entry)
        })
    }

    fn put(&self, key: &str, entry: StoreEntry) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let tick = state.touch();
        if !state.entries.contains_key(key) {
            state
                .entries
                .insert(key.to_string(), (Arc::new(entry), tick));
            state.evict_to(self.capacity);
        }
        state.entries.len()
    }

    fn update(&self, key: &str, entry: StoreEntry) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let tick = state.touch();
        state
            .entries
            .insert(key.to_string(), (Arc::new(entry), tick));
        state.evict_to(self.capacity);
        state.entries.len()
    }

    fn remove(&self, key: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.remove(key);
    }

    fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
    }

    fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::single;

    #[test]
    fn first_writer_wins() {
        let storage = LruStorage::new(4);
        assert_eq!(storage.put("k", single("k", "v1")), 1);
        assert_eq!(storage.put("k", single("k", "v2")), 1);
        assert_eq!(storage.content("k").as_deref(), Some("v1"));
    }

    #[test]
    fn evicts_least_recently_used() {
        let storage = LruStorage::new(2);
        storage.put("a", single("a", "1"));
        storage.put("b", single("b", "2"));

        // Reading "a" makes "b" the eviction candidate
        assert!(storage.get("a").is_some());
        assert_eq!(storage.put("c", single("c", "3")), 2);

        assert!(storage.get("a").is_some());
        assert!(storage.get("b").is_none());
        assert!(storage.get("c").is_some());
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let storage = LruStorage::new(0);
        assert_eq!(storage.capacity(), 1);
        storage.put("a", single("a", "1"));
        storage.put("b", single("b", "2"));
        assert_eq!(storage.len(), 1);
        assert!(storage.get("b").is_some());
    }
}
