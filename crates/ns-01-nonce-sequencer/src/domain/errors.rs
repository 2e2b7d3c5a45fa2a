//! Nonce sequencer error types.
//!
//! Store and network failures pass through unchanged; the sequencer never
//! retries, so callers see exactly what the collaborator reported.

use shared_types::{GatewayError, KVStoreError};
use thiserror::Error;

/// Nonce sequencer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NonceError {
    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] KVStoreError),

    /// Network lookup failure.
    #[error(transparent)]
    Network(#[from] GatewayError),
}

/// Result type for nonce operations.
pub type NonceResult<T> = Result<T, NonceError>;
