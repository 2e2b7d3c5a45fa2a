//! # Queue Worker
//!
//! The single background task draining the dispatch lane. Items are handled
//! strictly one at a time; a failure on one item is logged and the worker
//! moves on.
//!
//! The shutdown signal is only observed between items, so an item that is
//! mid-protocol finishes its current `process_index` call first.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::ports::outbound::{ChainGateway, QueueItemStore};
use crate::processor::ItemProcessor;

/// Drain `receiver` until shutdown is signalled or every sender is gone.
pub async fn run_worker<S, G>(
    processor: Arc<ItemProcessor<S, G>>,
    mut receiver: mpsc::Receiver<i64>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: QueueItemStore,
    G: ChainGateway,
{
    info!("[ns-02] Worker started");

    loop {
        let index = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!("[ns-02] Shutdown signal received");
                break;
            }
            next = receiver.recv() => match next {
                Some(index) => index,
                None => break,
            },
        };

        if let Err(e) = processor.process_index(index).await {
            error!(index, error = %e, "[ns-02] Failed to process item, continuing");
        }
    }

    info!("[ns-02] Worker stopped");
}
