//! # RocksDB Storage Adapter
//!
//! Durable implementation of the shared `KeyValueStore` port.
//!
//! ## Features
//!
//! - Snappy compression
//! - Bloom filters for point lookups
//! - fsync on every write (configurable)
//!
//! Queue items and nonce records live in the default column family and are
//! separated by key prefix.

use std::path::Path;

use rocksdb::{BlockBasedOptions, Cache, DBCompressionType, Direction, IteratorMode, Options, WriteOptions, DB};
use shared_types::{KVStoreError, KeyValueStore};
use tracing::info;

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/rocksdb".to_string(),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Rooted at `data_dir`, with production defaults.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("rocksdb").to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

fn io_error(op: &str, e: rocksdb::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("RocksDB {op} failed: {e}"),
    }
}

/// RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create a RocksDB database
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(DBCompressionType::Snappy);

        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| KVStoreError::IOError {
            message: format!("Failed to open RocksDB at {}: {}", config.path, e),
        })?;
        info!(path = %config.path, sync = config.sync_writes, "Opened RocksDB store");

        Ok(Self { db, config })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(|e| io_error("get", e))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.db
            .put_opt(key, value, &self.write_opts())
            .map_err(|e| io_error("put", e))
    }

    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError> {
        self.db
            .delete_opt(key, &self.write_opts())
            .map_err(|e| io_error("delete", e))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.db
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| io_error("exists check", e))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut results = Vec::new();
        for item in self.db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|e| io_error("scan", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }

    fn count_prefix(&self, prefix: &[u8]) -> Result<u64, KVStoreError> {
        let mut count = 0u64;
        for item in self.db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, _) = item.map_err(|e| io_error("scan", e))?;
            if !key.starts_with(prefix) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    fn flush(&self) -> Result<(), KVStoreError> {
        self.db.flush().map_err(|e| io_error("flush", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> RocksDbStore {
        RocksDbStore::open(RocksDbConfig::for_testing(
            dir.path().to_string_lossy().to_string(),
        ))
        .unwrap()
    }

    #[test]
    fn test_rocksdb_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        store.put(b"key1", b"value1").unwrap();
        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));

        assert!(store.exists(b"key1").unwrap());
        assert!(!store.exists(b"nonexistent").unwrap());

        store.delete(b"key1").unwrap();
        assert!(!store.exists(b"key1").unwrap());
    }

    #[test]
    fn test_rocksdb_prefix_scan_and_count() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);

        store.put(b"queue:0002", b"b").unwrap();
        store.put(b"queue:0001", b"a").unwrap();
        store.put(b"queue:0003", b"c").unwrap();
        store.put(b"nonce:0001", b"n").unwrap();

        let results = store.prefix_scan(b"queue:").unwrap();
        let values: Vec<_> = results.into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(store.count_prefix(b"queue:").unwrap(), 3);
        assert_eq!(store.count_prefix(b"missing:").unwrap(), 0);
    }

    #[test]
    fn test_rocksdb_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open(&temp_dir);
            store.put(b"queue:0001", b"persisted").unwrap();
            store.flush().unwrap();
        }

        let store = open(&temp_dir);
        assert_eq!(
            store.get(b"queue:0001").unwrap(),
            Some(b"persisted".to_vec())
        );
    }
}
