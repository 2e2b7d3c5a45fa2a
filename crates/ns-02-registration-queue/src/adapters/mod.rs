//! Adapters for the Registration Queue subsystem.

pub mod kv_store;

pub use kv_store::KvQueueItemStore;
