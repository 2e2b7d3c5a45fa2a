//! # Production Storage Adapters
//!
//! Durable storage backends for the shared `KeyValueStore` port.
//!
//! ## Usage
//!
//! Enable the `rocksdb` feature to use these adapters:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```
//!
//! Without the feature the node runs on `InMemoryKVStore` and nothing
//! survives a restart.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

pub use shared_types::InMemoryKVStore;
