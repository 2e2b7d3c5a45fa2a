//! Queue item and request types.

use serde::{Deserialize, Serialize};
use shared_types::{Secret, TxHash};

use crate::domain::status::QueueItemStatus;

/// Top-level domain stripped before the commitment is computed.
pub const TLD_SUFFIX: &str = ".any";

/// Kind of work a queue item performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// Commit-reveal registration of a new name.
    NameRegister,
    /// Extension of an existing registration.
    NameRenew,
}

/// Request to register a new name.
///
/// Arrives pre-validated; the queue stores every field verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameRegisterRequest {
    pub full_name: String,
    pub owner_any_address: String,
    pub owner_eth_address: String,
    pub space_id: String,
}

/// Request to renew an existing name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameRenewRequest {
    pub full_name: String,
    pub duration_sec: u64,
}

/// One durable registration job.
///
/// `index` is the primary key and the operation id handed to clients.
/// Only the state-machine driver changes `status`, and only through a
/// persisted write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub index: i64,
    pub item_type: ItemType,
    pub full_name: String,
    pub owner_any_address: String,
    pub owner_eth_address: String,
    pub space_id: String,
    /// Renew items only.
    pub renew_duration_sec: u64,
    /// Generated once at creation, reused for commit and register.
    pub secret: Secret,
    pub status: QueueItemStatus,
    pub tx_commit_hash: Option<TxHash>,
    pub tx_commit_nonce: Option<u64>,
    pub tx_register_hash: Option<TxHash>,
    pub tx_register_nonce: Option<u64>,
    pub tx_renew_hash: Option<TxHash>,
    pub tx_renew_nonce: Option<u64>,
    /// Unix seconds.
    pub date_created: u64,
    /// Unix seconds, refreshed on every persisted write.
    pub date_modified: u64,
}

impl QueueItem {
    /// New registration item in `Initial`.
    pub fn from_register_request(
        index: i64,
        req: NameRegisterRequest,
        secret: Secret,
        now: u64,
    ) -> Self {
        Self {
            index,
            item_type: ItemType::NameRegister,
            full_name: req.full_name,
            owner_any_address: req.owner_any_address,
            owner_eth_address: req.owner_eth_address,
            space_id: req.space_id,
            renew_duration_sec: 0,
            secret,
            status: QueueItemStatus::Initial,
            tx_commit_hash: None,
            tx_commit_nonce: None,
            tx_register_hash: None,
            tx_register_nonce: None,
            tx_renew_hash: None,
            tx_renew_nonce: None,
            date_created: now,
            date_modified: now,
        }
    }

    /// New renewal item in `Initial`.
    pub fn from_renew_request(index: i64, req: NameRenewRequest, secret: Secret, now: u64) -> Self {
        Self {
            index,
            item_type: ItemType::NameRenew,
            full_name: req.full_name,
            owner_any_address: String::new(),
            owner_eth_address: String::new(),
            space_id: String::new(),
            renew_duration_sec: req.duration_sec,
            secret,
            status: QueueItemStatus::Initial,
            tx_commit_hash: None,
            tx_commit_nonce: None,
            tx_register_hash: None,
            tx_register_nonce: None,
            tx_renew_hash: None,
            tx_renew_nonce: None,
            date_created: now,
            date_modified: now,
        }
    }
}

/// Name without its top-level domain: `"hello.any"` → `"hello"`.
///
/// Only a trailing `.any` is removed; anything else is returned unchanged.
pub fn name_first_part(full_name: &str) -> &str {
    full_name.strip_suffix(TLD_SUFFIX).unwrap_or(full_name)
}
