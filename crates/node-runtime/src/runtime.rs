//! # Node Runtime
//!
//! Owns the subsystem container and drives the registration queue through
//! its lifecycle.
//!
//! ## Startup Sequence
//!
//! 1. Build the subsystem container (store, ledger, sequencer, queue)
//! 2. Resume interrupted queue items
//! 3. Start the queue worker (unless background processing is disabled)
//!
//! ## Shutdown Sequence
//!
//! 1. Signal the worker to stop between items
//! 2. Wait for the current item, bounded by `shutdown_timeout_secs`
//! 3. Flush the store

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::container::{NodeConfig, SubsystemContainer};

/// The main node runtime orchestrating all subsystems.
pub struct NodeRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<SubsystemContainer>,
}

impl NodeRuntime {
    /// Create a new node runtime with configuration.
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating AnyNS registrar node runtime");
        let container =
            SubsystemContainer::new(config).context("Failed to initialize subsystems")?;
        Ok(Self::from_container(container))
    }

    /// Wrap an already built container.
    pub fn from_container(container: SubsystemContainer) -> Self {
        Self {
            container: Arc::new(container),
        }
    }

    /// Start the node runtime.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  AnyNS Registrar Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let config = &self.container.config;
        info!(
            endpoint = %config.chain.endpoint,
            admin = %config.chain.admin_address,
            data_dir = ?config.storage.data_dir,
            "Starting registration queue"
        );

        self.container
            .registration_queue
            .run()
            .await
            .context("Failed to start registration queue")?;

        if config.queue.skip_background_processing {
            warn!("Background processing disabled, queued items will not be sent");
        }
        info!("All subsystems running");
        Ok(())
    }

    /// Shutdown the node gracefully.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Initiating graceful shutdown...");

        let timeout = self.container.config.queue.shutdown_timeout();
        match tokio::time::timeout(timeout, self.container.registration_queue.close()).await {
            Ok(result) => result.context("Failed to close registration queue")?,
            Err(_) => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "Worker did not stop in time, its item resumes on next start"
                );
                self.container
                    .kv_store
                    .flush()
                    .context("Failed to flush store")?;
            }
        }

        info!("Shutdown complete");
        Ok(())
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
