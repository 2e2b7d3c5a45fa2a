//! Nonce sequencer entities.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Persisted nonce for one signing address.
///
/// `nonce` is the next value to present, never the last one attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRecord {
    /// Signing account (primary key).
    pub address: Address,
    /// Next usable nonce.
    pub nonce: u64,
}

impl NonceRecord {
    pub fn new(address: Address, nonce: u64) -> Self {
        Self { address, nonce }
    }
}
