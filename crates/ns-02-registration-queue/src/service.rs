//! Registration Queue Service - Core business logic
//!
//! Lifecycle:
//! 1. `run`: resume scan over every non-terminal bucket, then spawn the worker
//! 2. `add_new_request` / `add_renew_request`: persist, then announce
//! 3. `close`: stop the worker between items, flush the store

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ns_01_nonce_sequencer::NonceSequencerApi;
use parking_lot::Mutex;
use shared_types::{OperationState, Secret};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{
    NameRegisterRequest, NameRenewRequest, QueueError, QueueItem, QueueItemStatus, QueueResult,
    RESUME_BUCKETS,
};
use crate::lane::{DispatchLane, DEFAULT_LANE_CAPACITY};
use crate::ports::inbound::RegistrationQueueApi;
use crate::ports::outbound::{ChainGateway, QueueItemStore, SystemTimeSource, TimeSource};
use crate::processor::ItemProcessor;
use crate::worker::run_worker;

/// Registration queue configuration
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Announcements buffered by the dispatch lane
    pub lane_capacity: usize,
    /// Longest an add waits for a free lane slot
    pub enqueue_timeout: Duration,
    /// Mark items completed without touching the chain
    pub skip_processing: bool,
    /// Run the resume scan but never start the worker
    pub skip_background_processing: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            lane_capacity: DEFAULT_LANE_CAPACITY,
            enqueue_timeout: Duration::from_secs(5),
            skip_processing: false,
            skip_background_processing: false,
        }
    }
}

/// Registration Queue implementation
pub struct RegistrationQueue<S, G>
where
    S: QueueItemStore + 'static,
    G: ChainGateway + 'static,
{
    config: QueueConfig,
    store: Arc<S>,
    processor: Arc<ItemProcessor<S, G>>,
    time: Arc<dyn TimeSource>,
    lane: DispatchLane,
    /// Serializes index assignment: held from `count` through `insert`.
    create_lock: tokio::sync::Mutex<()>,
    receiver: Mutex<Option<mpsc::Receiver<i64>>>,
    running: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S, G> RegistrationQueue<S, G>
where
    S: QueueItemStore + 'static,
    G: ChainGateway + 'static,
{
    /// Create a new registration queue using the system clock.
    pub fn new(
        config: QueueConfig,
        store: Arc<S>,
        gateway: Arc<G>,
        nonces: Arc<dyn NonceSequencerApi>,
    ) -> Self {
        Self::with_time_source(config, store, gateway, nonces, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(
        config: QueueConfig,
        store: Arc<S>,
        gateway: Arc<G>,
        nonces: Arc<dyn NonceSequencerApi>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let processor = Arc::new(ItemProcessor::new(
            Arc::clone(&store),
            gateway,
            nonces,
            Arc::clone(&time),
            config.skip_processing,
        ));
        let (lane, receiver) = DispatchLane::new(config.lane_capacity, config.enqueue_timeout);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            store,
            processor,
            time,
            lane,
            create_lock: tokio::sync::Mutex::new(()),
            receiver: Mutex::new(Some(receiver)),
            running: AtomicBool::new(false),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Resume interrupted items, then start the single worker.
    ///
    /// # Errors
    /// - `AlreadyRunning`: called a second time
    /// - `Store`: the resume scan could not read the store
    pub async fn run(&self) -> QueueResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(QueueError::AlreadyRunning);
        }

        if let Err(e) = self.resume().await {
            self.running.store(false, Ordering::SeqCst);
            return Err(e);
        }

        if self.config.skip_background_processing {
            info!("[ns-02] Background processing disabled, worker not started");
            return Ok(());
        }

        let Some(receiver) = self.receiver.lock().take() else {
            return Err(QueueError::AlreadyRunning);
        };
        let handle = tokio::spawn(run_worker(
            Arc::clone(&self.processor),
            receiver,
            self.shutdown_tx.subscribe(),
        ));
        *self.worker.lock() = Some(handle);
        Ok(())
    }

    /// Stop the worker and flush the store.
    pub async fn close(&self) -> QueueResult<()> {
        self.shutdown_tx.send_replace(true);

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "[ns-02] Worker task failed");
            }
        }

        self.store.flush().await?;
        info!("[ns-02] Queue closed");
        Ok(())
    }

    /// Startup resume scan.
    ///
    /// Each bucket is drained until it yields no item this scan has not
    /// already attempted, so an item whose transition cannot be persisted is
    /// tried once instead of forever.
    pub async fn resume(&self) -> QueueResult<()> {
        for bucket in RESUME_BUCKETS {
            let mut attempted = HashSet::new();
            loop {
                let next = self
                    .store
                    .find_by_status(bucket)
                    .await?
                    .into_iter()
                    .find(|item| !attempted.contains(&item.index));
                let Some(item) = next else {
                    break;
                };

                attempted.insert(item.index);
                let index = item.index;
                if let Err(e) = self.processor.process_item(item).await {
                    error!(index, error = %e, "[ns-02] Failed to resume item, continuing");
                }
            }

            if !attempted.is_empty() {
                info!(bucket = %bucket, count = attempted.len(), "[ns-02] Resumed items");
            }
        }
        Ok(())
    }

    /// Process a single item now, outside the worker.
    pub async fn process_item(&self, item: QueueItem) -> QueueResult<QueueItemStatus> {
        self.processor.process_item(item).await
    }

    async fn enqueue_new(&self, build: impl FnOnce(i64, Secret, u64) -> QueueItem) -> QueueResult<i64> {
        let secret = Secret::random().map_err(|e| QueueError::SecretGeneration(e.to_string()))?;

        let item = {
            let _guard = self.create_lock.lock().await;
            let index = i64::try_from(self.store.count().await?).unwrap_or(i64::MAX);
            let item = build(index, secret, self.time.now());
            self.store.insert(&item).await?;
            item
        };
        let index = item.index;
        info!(index, item_type = ?item.item_type, "[ns-02] Inserted pending operation");

        if let Err(e) = self.lane.add(index).await {
            warn!(index, error = %e, "[ns-02] Item persisted but not announced");
            return Err(e);
        }
        Ok(index)
    }
}

#[async_trait]
impl<S, G> RegistrationQueueApi for RegistrationQueue<S, G>
where
    S: QueueItemStore + 'static,
    G: ChainGateway + 'static,
{
    async fn add_new_request(&self, req: NameRegisterRequest) -> QueueResult<i64> {
        self.enqueue_new(|index, secret, now| {
            QueueItem::from_register_request(index, req, secret, now)
        })
        .await
    }

    async fn add_renew_request(&self, req: NameRenewRequest) -> QueueResult<i64> {
        self.enqueue_new(|index, secret, now| QueueItem::from_renew_request(index, req, secret, now))
            .await
    }

    async fn get_request_status(&self, operation_id: i64) -> QueueResult<OperationState> {
        let item = self
            .store
            .get_by_index(operation_id)
            .await?
            .ok_or(QueueError::ItemNotFound {
                index: operation_id,
            })?;
        Ok(item.status.to_operation_state())
    }
}
