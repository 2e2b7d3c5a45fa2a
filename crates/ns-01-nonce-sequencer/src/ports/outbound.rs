//! Outbound (Driven) ports for the Nonce Sequencer subsystem.

use async_trait::async_trait;
use shared_types::{Address, GatewayError};

use crate::domain::{NonceRecord, NonceResult};

/// Durable storage for nonce records, keyed by address.
///
/// Production/testing: `KvNonceStore` over any `KeyValueStore`.
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Point lookup by address.
    async fn get(&self, address: &Address) -> NonceResult<Option<NonceRecord>>;

    /// Replace-or-insert the record for `record.address`.
    async fn upsert(&self, record: &NonceRecord) -> NonceResult<()>;
}

/// Network view of an account's transaction count.
#[async_trait]
pub trait NetworkNonceSource: Send + Sync {
    /// Mined + pending transaction count for `address`.
    async fn pending_nonce_at(&self, address: &Address) -> Result<u64, GatewayError>;
}
