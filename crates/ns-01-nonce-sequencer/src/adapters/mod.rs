//! Adapters for the Nonce Sequencer subsystem.

pub mod kv_store;

pub use kv_store::KvNonceStore;
