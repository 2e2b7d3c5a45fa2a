//! # Key-Value Storage Port
//!
//! Abstract interface for the durable store backing queue items and nonce
//! records.
//!
//! Production: `RocksDbStore` (node-runtime/adapters/storage/rocksdb_adapter.rs)
//! Testing: `InMemoryKVStore` (below)
//!
//! Every `put` is an atomic replace-or-insert of a single key. No
//! multi-key transactions are offered or assumed.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::errors::KVStoreError;

/// Abstract interface for key-value database operations.
///
/// Implementations use interior mutability so one store can be shared
/// between subsystems behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair, replacing any previous value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// All pairs whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;

    /// Number of keys starting with `prefix`.
    fn count_prefix(&self, prefix: &[u8]) -> Result<u64, KVStoreError> {
        Ok(self.prefix_scan(prefix)?.len() as u64)
    }

    /// Flush buffered writes to durable media.
    fn flush(&self) -> Result<(), KVStoreError> {
        Ok(())
    }
}

/// In-memory key-value store for unit tests and development runs.
///
/// Ordered so `prefix_scan` matches RocksDB iteration order.
/// Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.read().contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let data = self.data.read();
        let results = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn count_prefix(&self, prefix: &[u8]) -> Result<u64, KVStoreError> {
        let data = self.data.read();
        let count = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .count();
        Ok(count as u64)
    }
}
