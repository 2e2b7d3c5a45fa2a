//! Registration queue error types.
//!
//! Two families:
//! - step failures (commit/register/renew phase, preconditions): the driver
//!   turns them into a terminal status and stops the item
//! - infrastructure failures (store, nonce bookkeeping): escalated to the
//!   caller with the item left at its last persisted status

use ns_01_nonce_sequencer::NonceError;
use shared_types::{GatewayError, KVStoreError};
use thiserror::Error;

use crate::domain::entities::ItemType;
use crate::domain::status::QueueItemStatus;

/// Registration queue errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Commit submission or confirmation failed.
    #[error("Failed to commit name: {reason}")]
    CommitFailed { reason: String },

    /// Register submission or confirmation failed.
    #[error("Failed to register name: {reason}")]
    RegisterFailed { reason: String },

    /// Renew submission or confirmation failed.
    #[error("Failed to renew name: {reason}")]
    RenewFailed { reason: String },

    /// A confirmation step found no recorded transaction hash.
    #[error("Tx hash is empty for {phase} phase")]
    EmptyTxHash { phase: &'static str },

    /// Status is not valid for the item's type.
    #[error("Item {index} has status {status} which is invalid for {item_type:?}")]
    InvalidState {
        index: i64,
        item_type: ItemType,
        status: QueueItemStatus,
    },

    /// `owner_eth_address` is not a 20-byte hex address.
    #[error("Invalid owner address '{value}': {reason}")]
    InvalidOwnerAddress { value: String, reason: String },

    /// Connection or controller binding failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Durable store failure.
    #[error(transparent)]
    Store(#[from] KVStoreError),

    /// Nonce bookkeeping failure.
    #[error(transparent)]
    Nonce(#[from] NonceError),

    /// No item with this index.
    #[error("Item not found: {index}")]
    ItemNotFound { index: i64 },

    /// An item with this index already exists.
    #[error("Duplicate item index: {index}")]
    DuplicateIndex { index: i64 },

    /// Secret generation failed.
    #[error("Can not generate secret: {0}")]
    SecretGeneration(String),

    /// Dispatch lane stayed full past the enqueue timeout.
    #[error("Dispatch lane full, item {index} left for the next resume scan")]
    LaneFull { index: i64 },

    /// Dispatch lane has no receiver.
    #[error("Dispatch lane closed")]
    LaneClosed,

    /// `run` was called twice.
    #[error("Queue is already running")]
    AlreadyRunning,
}

impl QueueError {
    /// Returns true if the driver must escalate instead of failing the item.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            QueueError::Store(_) | QueueError::Nonce(_) | QueueError::ItemNotFound { .. }
        )
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
