//! Asset content storage
//!
//! Entries are addressed by cache key and never mutated once written.
//! `put` only inserts absent keys, so concurrent requests computing the same
//! entry race harmlessly: the first writer wins and every writer's value is
//! equivalent. `update` is the explicit overwrite used right after processing.

pub mod lru;
pub mod memory;

pub use lru::LruStorage;
pub use memory::MemoryStorage;

use crate::asset::ResolvedAsset;
use crate::config::schema::CacheConfig;
use crate::error::{DandelionError, DandelionResult};
use std::sync::Arc;

/// A stored asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEntry {
    /// One asset and its processed content, if already fetched
    Single {
        asset: ResolvedAsset,
        content: Option<String>,
    },
    /// A synthetic asset standing for several merged assets, in order
    Merged {
        asset: ResolvedAsset,
        constituents: Vec<ResolvedAsset>,
    },
}

impl StoreEntry {
    /// Asset the entry was stored for
    pub fn asset(&self) -> &ResolvedAsset {
        match self {
            Self::Single { asset, .. } | Self::Merged { asset, .. } => asset,
        }
    }

    /// Processed content of a single entry
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Single { content, .. } => content.as_deref(),
            Self::Merged { .. } => None,
        }
    }
}

/// Key to entry store shared by all requests
pub trait AssetStorage: Send + Sync {
    /// Storage name, as used in configuration
    fn name(&self) -> &'static str;

    /// Entry stored under `key`
    fn get(&self, key: &str) -> Option<Arc<StoreEntry>>;

    /// Insert `entry` unless `key` is present; returns the resulting size
    fn put(&self, key: &str, entry: StoreEntry) -> usize;

    /// Insert or replace `entry`; returns the resulting size
    fn update(&self, key: &str, entry: StoreEntry) -> usize;

    /// Remove the entry stored under `key`
    fn remove(&self, key: &str);

    /// Remove every entry
    fn clear(&self);

    /// Number of entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Processed content stored under `key`, if any
    fn content(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|entry| entry.content().map(str::to_string))
    }
}

/// Create the storage named in the configuration
pub fn create_storage(config: &CacheConfig) -> DandelionResult<Arc<dyn AssetStorage>> {
    match config.storage.as_str() {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        "lru" => Ok(Arc::new(LruStorage::new(config.asset_max_size))),
        other => Err(DandelionError::UnknownStorage(other.to_string())),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_known_storages() {
        let memory = create_storage(&CacheConfig::default()).unwrap();
        assert_eq!(memory.name(), "memory");

        let config = CacheConfig {
            storage: "lru".to_string(),
            asset_max_size: 2,
        };
        assert_eq!(create_storage(&config).unwrap().name(), "lru");
    }

    #[test]
    fn unknown_storage_is_config_error() {
        let config = CacheConfig {
            storage: "redis".to_string(),
            ..CacheConfig::default()
        };
        let err = create_storage(&config).err().unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn merged_entry_has_no_content() {
        let entry = StoreEntry::Merged {
            asset: fixtures::asset("merged"),
            constituents: vec![fixtures::asset("a")],
        };
        assert_eq!(entry.content(), None);
        assert_eq!(entry.asset().name, "merged");
    }
}
