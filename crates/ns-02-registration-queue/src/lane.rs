//! # Dispatch Lane
//!
//! Bounded in-memory channel announcing item indices to the worker.
//!
//! The lane is a notification path only. It is not persisted; anything lost
//! with it is recovered by the startup resume scan, because the store is the
//! source of truth.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tracing::warn;

use crate::domain::{QueueError, QueueResult};

/// Default number of announcements the lane buffers.
pub const DEFAULT_LANE_CAPACITY: usize = 10;

/// Sending half of the dispatch lane.
#[derive(Clone)]
pub struct DispatchLane {
    sender: mpsc::Sender<i64>,
    enqueue_timeout: Duration,
}

impl DispatchLane {
    /// Create a lane and its receiving half.
    pub fn new(capacity: usize, enqueue_timeout: Duration) -> (Self, mpsc::Receiver<i64>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                enqueue_timeout,
            },
            receiver,
        )
    }

    /// Announce `index`, waiting at most the enqueue timeout for a free slot.
    pub async fn add(&self, index: i64) -> QueueResult<()> {
        match self.sender.send_timeout(index, self.enqueue_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                warn!(index, "[ns-02] Dispatch lane full");
                Err(QueueError::LaneFull { index })
            }
            Err(SendTimeoutError::Closed(_)) => {
                warn!(index, "[ns-02] Dispatch lane closed");
                Err(QueueError::LaneClosed)
            }
        }
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }
}
