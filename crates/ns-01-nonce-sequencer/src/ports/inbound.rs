//! # Inbound Port - NonceSequencerApi
//!
//! Driving port used by every component that signs admin transactions: the
//! chain gateway when it builds auth options, and the registration queue when
//! it records a mined transaction.

use async_trait::async_trait;
use shared_types::Address;

use crate::domain::NonceResult;

/// Primary API for the Nonce Sequencer subsystem.
#[async_trait]
pub trait NonceSequencerApi: Send + Sync {
    /// Nonce to embed in the next transaction from `address`.
    ///
    /// Override first, then the persisted record, then the network.
    ///
    /// # Errors
    /// - `Store`: the persisted record could not be read
    /// - `Network`: no record, no override, and the network lookup failed
    async fn get_current_nonce(&self, address: &Address) -> NonceResult<u64>;

    /// Mined + pending transaction count for `address`.
    ///
    /// Point-in-time and not authoritative: transactions this process has
    /// submitted may not be visible to the node yet.
    async fn get_current_nonce_from_network(&self, address: &Address) -> NonceResult<u64>;

    /// Persist `value` as the next usable nonce for `address`.
    ///
    /// Call only after the transaction signed with `value - 1` is mined.
    /// Recording an unmined or failed transaction creates a gap.
    async fn save_nonce(&self, address: &Address, value: u64) -> NonceResult<u64>;
}
