//! # Inbound Port - RegistrationQueueApi
//!
//! Driving port consumed by the RPC layer. Validation of names, owners and
//! admin identity happens before these calls; the queue stores requests
//! verbatim.

use async_trait::async_trait;
use shared_types::OperationState;

use crate::domain::{NameRegisterRequest, NameRenewRequest, QueueResult};

/// Primary API for the Registration Queue subsystem.
#[async_trait]
pub trait RegistrationQueueApi: Send + Sync {
    /// Persist a new registration item and announce it to the worker.
    ///
    /// Returns the operation id (the item's index).
    ///
    /// # Errors
    /// - `Store`: the item could not be persisted
    /// - `LaneFull` / `LaneClosed`: the item was persisted but not announced;
    ///   it stays `Initial` until the next resume scan
    async fn add_new_request(&self, req: NameRegisterRequest) -> QueueResult<i64>;

    /// Persist a new renewal item and announce it to the worker.
    async fn add_renew_request(&self, req: NameRenewRequest) -> QueueResult<i64>;

    /// Coarse state of an operation.
    ///
    /// # Errors
    /// - `ItemNotFound`: no item with this id
    async fn get_request_status(&self, operation_id: i64) -> QueueResult<OperationState>;
}
