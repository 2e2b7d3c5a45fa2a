//! # Subsystem Container
//!
//! Holds all core subsystem instances and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Phase 1: Key-value store (RocksDB or in-memory)
//! Phase 2: Chain ledger (network nonce source)
//! Phase 3: [1] Nonce Sequencer   (store + ledger)
//! Phase 4: [2] Registration Queue (store + gateway + nonce sequencer)
//! ```
//!
//! The nonce sequencer and the registration queue share one store; their
//! records are separated by key prefix.

use std::sync::Arc;
use std::time::Duration;

use ns_01_nonce_sequencer::{KvNonceStore, NonceSequencer, NonceSequencerApi};
use ns_02_registration_queue::{KvQueueItemStore, RegistrationQueue};
use shared_types::{InMemoryKVStore, KVStoreError, KeyValueStore};
use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{DevChainGateway, DevLedger};
use crate::container::config::NodeConfig;

/// Endpoint scheme served by the in-process development ledger.
pub const DEV_ENDPOINT_SCHEME: &str = "dev://";

/// Nonce sequencer as wired by the container.
pub type ConcreteNonceSequencer = NonceSequencer<KvNonceStore, DevLedger>;

/// Registration queue as wired by the container.
pub type ConcreteRegistrationQueue = RegistrationQueue<KvQueueItemStore, DevChainGateway>;

/// Container construction errors.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// No gateway is available for the configured endpoint.
    #[error("Unsupported chain endpoint '{0}': only dev:// endpoints are available")]
    UnsupportedEndpoint(String),

    /// The durable store could not be opened.
    #[error("Failed to open storage: {0}")]
    Storage(#[from] KVStoreError),
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Store shared by every subsystem.
    pub kv_store: Arc<dyn KeyValueStore>,

    /// Development ledger behind the chain gateway.
    pub ledger: Arc<DevLedger>,

    /// Nonce Sequencer (Subsystem 1)
    pub nonce_sequencer: Arc<ConcreteNonceSequencer>,

    /// Registration Queue (Subsystem 2)
    /// Depends on the Nonce Sequencer for every transaction it signs.
    pub registration_queue: Arc<ConcreteRegistrationQueue>,

    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Create a container, opening the store named by the configuration.
    #[instrument(name = "subsystem_init", skip(config))]
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        info!("Phase 1: Opening key-value store");
        let kv_store = Self::open_store(&config)?;
        Self::with_store(config, kv_store)
    }

    /// Create a container over an already opened store.
    ///
    /// Used by tests to simulate a restart over the same data.
    pub fn with_store(
        config: NodeConfig,
        kv_store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ContainerError> {
        if !config.chain.endpoint.starts_with(DEV_ENDPOINT_SCHEME) {
            return Err(ContainerError::UnsupportedEndpoint(
                config.chain.endpoint.clone(),
            ));
        }

        info!("Phase 2: Connecting chain ledger");
        let ledger = Arc::new(DevLedger::new(Duration::from_millis(
            config.chain.block_time_ms,
        )));
        info!(
            endpoint = %config.chain.endpoint,
            block_time_ms = config.chain.block_time_ms,
            "  Development ledger ready"
        );

        Self::with_ledger(config, kv_store, ledger)
    }

    /// Create a container over an existing store and ledger.
    ///
    /// A shared ledger lets tests restart the node against the same chain.
    pub fn with_ledger(
        config: NodeConfig,
        kv_store: Arc<dyn KeyValueStore>,
        ledger: Arc<DevLedger>,
    ) -> Result<Self, ContainerError> {
        info!("Phase 3: Initializing Nonce Sequencer");
        let nonce_sequencer = Arc::new(NonceSequencer::new(
            config.nonce.to_nonce_config(),
            Arc::new(KvNonceStore::new(Arc::clone(&kv_store))),
            Arc::clone(&ledger),
        ));
        info!("  [1] Nonce Sequencer initialized");

        info!("Phase 4: Initializing Registration Queue");
        let nonces: Arc<dyn NonceSequencerApi> = nonce_sequencer.clone();
        let gateway = Arc::new(DevChainGateway::new(
            Arc::clone(&ledger),
            Arc::clone(&nonces),
            config.chain.endpoint.clone(),
            config.chain.admin_address,
            config.chain.controller_address,
            config.chain.gas_limit,
        ));
        let registration_queue = Arc::new(RegistrationQueue::new(
            config.queue.to_queue_config(),
            Arc::new(KvQueueItemStore::new(Arc::clone(&kv_store))),
            gateway,
            nonces,
        ));
        info!(
            lane_capacity = config.queue.lane_capacity,
            "  [2] Registration Queue initialized"
        );

        Ok(Self {
            kv_store,
            ledger,
            nonce_sequencer,
            registration_queue,
            config,
        })
    }

    #[cfg(feature = "rocksdb")]
    fn open_store(config: &NodeConfig) -> Result<Arc<dyn KeyValueStore>, ContainerError> {
        use crate::adapters::{RocksDbConfig, RocksDbStore};

        if config.storage.in_memory {
            info!("  In-memory store selected");
            return Ok(Arc::new(InMemoryKVStore::new()));
        }
        let store = RocksDbStore::open(RocksDbConfig::in_dir(&config.storage.data_dir))?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "rocksdb"))]
    fn open_store(config: &NodeConfig) -> Result<Arc<dyn KeyValueStore>, ContainerError> {
        if !config.storage.in_memory {
            tracing::warn!(
                data_dir = %config.storage.data_dir.display(),
                "  Built without the rocksdb feature, using in-memory store"
            );
        }
        Ok(Arc::new(InMemoryKVStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_dev_endpoint() {
        let mut config = NodeConfig::default();
        config.chain.endpoint = "https://rpc.example.org".to_string();

        let result = SubsystemContainer::with_store(config, Arc::new(InMemoryKVStore::new()));
        assert!(matches!(
            result,
            Err(ContainerError::UnsupportedEndpoint(_))
        ));
    }

    #[test]
    fn test_in_memory_container_builds() {
        let mut config = NodeConfig::default();
        config.storage.in_memory = true;

        let container = SubsystemContainer::new(config).unwrap();
        assert_eq!(container.registration_queue.config().lane_capacity, 10);
    }
}
