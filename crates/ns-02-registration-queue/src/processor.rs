//! # Item Processor - State-Machine Driver
//!
//! Advances one queue item through its protocol until it stops.
//!
//! ```text
//! process_item ──→ name_register ──loop──→ move_state_next ──→ step (chain calls)
//!                       │                        │
//!                       │                        └── Ok → table success target
//!                       │                            Err(step) → table failure target
//!                       │                            Err(infra) → escalate, nothing persisted
//!                       └── persist on status change, stop on is_stop_processing
//! ```
//!
//! Confirmation steps re-fetch the transaction by its recorded hash, so a
//! resumed item never resubmits a transaction it already sent.

use std::sync::Arc;

use ns_01_nonce_sequencer::NonceSequencerApi;
use shared_types::{Address, NameRegistration, TxHash};
use tracing::{debug, error, info, warn};

use crate::domain::{
    is_stop_processing, name_first_part, ItemType, QueueError, QueueItem, QueueItemStatus,
    QueueResult,
};
use crate::ports::outbound::{ChainGateway, QueueItemStore, TimeSource};

/// Transaction phase confirmed by a step.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Commit,
    Register,
    Renew,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Commit => "commit",
            Phase::Register => "register",
            Phase::Renew => "renew",
        }
    }

    fn failed(self, reason: impl ToString) -> QueueError {
        let reason = reason.to_string();
        match self {
            Phase::Commit => QueueError::CommitFailed { reason },
            Phase::Register => QueueError::RegisterFailed { reason },
            Phase::Renew => QueueError::RenewFailed { reason },
        }
    }
}

/// Drives queue items through the commit-reveal and renew protocols.
pub struct ItemProcessor<S, G>
where
    S: QueueItemStore,
    G: ChainGateway,
{
    store: Arc<S>,
    gateway: Arc<G>,
    nonces: Arc<dyn NonceSequencerApi>,
    time: Arc<dyn TimeSource>,
    skip_processing: bool,
}

impl<S, G> ItemProcessor<S, G>
where
    S: QueueItemStore,
    G: ChainGateway,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<G>,
        nonces: Arc<dyn NonceSequencerApi>,
        time: Arc<dyn TimeSource>,
        skip_processing: bool,
    ) -> Self {
        Self {
            store,
            gateway,
            nonces,
            time,
            skip_processing,
        }
    }

    /// Re-read item `index` from the store and process it.
    pub async fn process_index(&self, index: i64) -> QueueResult<QueueItemStatus> {
        let item = self
            .store
            .get_by_index(index)
            .await?
            .ok_or(QueueError::ItemNotFound { index })?;
        self.process_item(item).await
    }

    /// Process one item until it stops. Returns the final status.
    ///
    /// Step failures are absorbed into a terminal status. Store and nonce
    /// bookkeeping failures are returned with the item left at its last
    /// persisted status.
    pub async fn process_item(&self, mut item: QueueItem) -> QueueResult<QueueItemStatus> {
        if item.status.is_terminal() {
            debug!(index = item.index, status = %item.status, "[ns-02] Item already terminal");
            return Ok(item.status);
        }

        if self.skip_processing {
            info!(index = item.index, "[ns-02] Skipping processing, marking item completed");
            item.status = QueueItemStatus::Completed;
            self.persist(&mut item).await?;
            return Ok(item.status);
        }

        info!(
            index = item.index,
            item_type = ?item.item_type,
            status = %item.status,
            "[ns-02] Processing item"
        );
        self.name_register(&mut item).await?;
        Ok(item.status)
    }

    /// Driving loop: step, persist on change, stop when told to.
    pub async fn name_register(&self, item: &mut QueueItem) -> QueueResult<()> {
        loop {
            let previous = item.status;
            let (next, step_failed) = match self.move_state_next(item).await {
                Ok(next) => (next, false),
                Err(e) if e.is_infrastructure() => {
                    error!(
                        index = item.index,
                        status = %previous,
                        error = %e,
                        "[ns-02] Infrastructure failure, item left at last persisted status"
                    );
                    return Err(e);
                }
                Err(e) => {
                    let failed = previous.on_failure(item.item_type);
                    warn!(
                        index = item.index,
                        from = %previous,
                        to = %failed,
                        error = %e,
                        "[ns-02] Step failed"
                    );
                    (failed, true)
                }
            };

            if next != previous {
                item.status = next;
                self.persist(item).await?;
                info!(index = item.index, from = %previous, to = %next, "[ns-02] Status changed");
            }

            if is_stop_processing(next, step_failed) {
                return Ok(());
            }
        }
    }

    /// Run the step for the item's current status and return the next status.
    ///
    /// Terminal statuses are returned unchanged without touching the chain.
    pub async fn move_state_next(&self, item: &mut QueueItem) -> QueueResult<QueueItemStatus> {
        use QueueItemStatus::*;

        let status = item.status;
        if status.is_terminal() {
            return Ok(status);
        }

        match (item.item_type, status) {
            (ItemType::NameRegister, Initial) => self.send_commit(item).await?,
            (ItemType::NameRegister, CommitSent) => {
                self.confirm_mined(item.tx_commit_hash, Phase::Commit).await?
            }
            (ItemType::NameRegister, CommitDone) => self.send_register(item).await?,
            (ItemType::NameRegister, RegisterSent) => {
                self.confirm_mined(item.tx_register_hash, Phase::Register)
                    .await?
            }
            (ItemType::NameRenew, Initial) => self.send_renew(item).await?,
            (ItemType::NameRenew, RenewSent) => {
                self.confirm_mined(item.tx_renew_hash, Phase::Renew).await?
            }
            _ => return Err(invalid_state(item)),
        }

        status
            .on_success(item.item_type)
            .ok_or_else(|| invalid_state(item))
    }

    async fn send_commit(&self, item: &mut QueueItem) -> QueueResult<()> {
        let conn = self.gateway.create_connection().await?;
        let controller = self.gateway.connect_to_controller(&conn).await?;
        let account = parse_owner(&item.owner_eth_address)?;

        let registration = NameRegistration {
            name: name_first_part(&item.full_name),
            account,
            secret: &item.secret,
            full_name: &item.full_name,
            owner_any_address: &item.owner_any_address,
            space_id: &item.space_id,
        };
        let commitment = self
            .gateway
            .make_commitment(&registration, &controller)
            .await
            .map_err(|e| Phase::Commit.failed(e))?;
        let auth = self
            .gateway
            .generate_auth_opts_for_admin(&conn)
            .await
            .map_err(|e| Phase::Commit.failed(e))?;
        let tx = self
            .gateway
            .commit(&auth, &commitment, &controller)
            .await
            .map_err(|e| Phase::Commit.failed(e))?;

        info!(index = item.index, tx = %tx.hash, nonce = tx.nonce, "[ns-02] Commit sent");
        item.tx_commit_hash = Some(tx.hash);
        item.tx_commit_nonce = Some(tx.nonce);
        Ok(())
    }

    async fn send_register(&self, item: &mut QueueItem) -> QueueResult<()> {
        let conn = self.gateway.create_connection().await?;
        let controller = self.gateway.connect_to_controller(&conn).await?;
        let account = parse_owner(&item.owner_eth_address)?;

        // fresh options: the commit consumed the previous nonce
        let auth = self
            .gateway
            .generate_auth_opts_for_admin(&conn)
            .await
            .map_err(|e| Phase::Register.failed(e))?;
        let registration = NameRegistration {
            name: name_first_part(&item.full_name),
            account,
            secret: &item.secret,
            full_name: &item.full_name,
            owner_any_address: &item.owner_any_address,
            space_id: &item.space_id,
        };
        let tx = self
            .gateway
            .register(&auth, &registration, &controller)
            .await
            .map_err(|e| Phase::Register.failed(e))?;

        info!(index = item.index, tx = %tx.hash, nonce = tx.nonce, "[ns-02] Register sent");
        item.tx_register_hash = Some(tx.hash);
        item.tx_register_nonce = Some(tx.nonce);
        Ok(())
    }

    async fn send_renew(&self, item: &mut QueueItem) -> QueueResult<()> {
        let conn = self.gateway.create_connection().await?;
        let controller = self.gateway.connect_to_controller(&conn).await?;
        let auth = self
            .gateway
            .generate_auth_opts_for_admin(&conn)
            .await
            .map_err(|e| Phase::Renew.failed(e))?;
        let tx = self
            .gateway
            .renew_name(&auth, &item.full_name, item.renew_duration_sec, &controller)
            .await
            .map_err(|e| Phase::Renew.failed(e))?;

        info!(index = item.index, tx = %tx.hash, nonce = tx.nonce, "[ns-02] Renew sent");
        item.tx_renew_hash = Some(tx.hash);
        item.tx_renew_nonce = Some(tx.nonce);
        Ok(())
    }

    /// Re-fetch by hash, wait for mining, then record the sender's next nonce.
    async fn confirm_mined(&self, hash: Option<TxHash>, phase: Phase) -> QueueResult<()> {
        let hash = hash.ok_or(QueueError::EmptyTxHash {
            phase: phase.name(),
        })?;

        let conn = self.gateway.create_connection().await?;
        let tx = self
            .gateway
            .tx_by_hash(&conn, &hash)
            .await
            .map_err(|e| phase.failed(e))?;
        let mined = self
            .gateway
            .wait_mined(&conn, &tx)
            .await
            .map_err(|e| phase.failed(e))?;
        if !mined {
            return Err(phase.failed(format!("tx {hash} was not mined successfully")));
        }

        self.nonces
            .save_nonce(&tx.from, tx.nonce.saturating_add(1))
            .await?;
        debug!(tx = %hash, phase = phase.name(), "[ns-02] Transaction mined");
        Ok(())
    }

    async fn persist(&self, item: &mut QueueItem) -> QueueResult<()> {
        item.date_modified = self.time.now();
        self.store.replace(item).await.map_err(|e| {
            error!(index = item.index, error = %e, "[ns-02] Failed to update item in store");
            e
        })
    }
}

fn parse_owner(value: &str) -> QueueResult<Address> {
    value
        .parse()
        .map_err(|e: shared_types::HexParseError| QueueError::InvalidOwnerAddress {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn invalid_state(item: &QueueItem) -> QueueError {
    QueueError::InvalidState {
        index: item.index,
        item_type: item.item_type,
        status: item.status,
    }
}
