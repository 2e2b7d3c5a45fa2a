//! # Key-Value Nonce Store
//!
//! `NonceStore` over a shared `KeyValueStore`.
//!
//! Layout: `nonce:<0x-address>` → bincode(`NonceRecord`). One key per
//! address, so every upsert is a single atomic put.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Address, KVStoreError, KeyValueStore};

use crate::domain::{NonceRecord, NonceResult};
use crate::ports::outbound::NonceStore;

/// Key prefix for nonce records.
pub const NONCE_PREFIX: &[u8] = b"nonce:";

pub struct KvNonceStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvNonceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn make_key(address: &Address) -> Vec<u8> {
        let mut key = NONCE_PREFIX.to_vec();
        key.extend_from_slice(address.to_string().as_bytes());
        key
    }
}

#[async_trait]
impl NonceStore for KvNonceStore {
    async fn get(&self, address: &Address) -> NonceResult<Option<NonceRecord>> {
        let key = Self::make_key(address);
        let Some(bytes) = self.kv.get(&key)? else {
            return Ok(None);
        };
        let record = bincode::deserialize(&bytes).map_err(|e| KVStoreError::Corrupted {
            key: String::from_utf8_lossy(&key).into_owned(),
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }

    async fn upsert(&self, record: &NonceRecord) -> NonceResult<()> {
        let key = Self::make_key(&record.address);
        let bytes = bincode::serialize(record).map_err(|e| KVStoreError::Corrupted {
            key: String::from_utf8_lossy(&key).into_owned(),
            message: e.to_string(),
        })?;
        self.kv.put(&key, &bytes)?;
        Ok(())
    }
}
