//! Nonce Sequencer Service - Core business logic
//!
//! Resolution policy:
//! 1. a configured override wins over everything (stuck-nonce recovery)
//! 2. otherwise the persisted record for the address
//! 3. otherwise mined + pending count from the network
//!
//! A "nonce too low" rejection needs a fresh network read; a "nonce too high"
//! one needs an operator. Neither is repaired here.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::Address;
use tracing::{debug, error, info};

use crate::domain::{NonceRecord, NonceResult};
use crate::ports::inbound::NonceSequencerApi;
use crate::ports::outbound::{NetworkNonceSource, NonceStore};

/// Nonce sequencer configuration
#[derive(Clone, Debug, Default)]
pub struct NonceConfig {
    /// Static nonce returned for every lookup while set.
    pub nonce_override: Option<u64>,
}

/// Nonce Sequencer implementation
pub struct NonceSequencer<S, N>
where
    S: NonceStore,
    N: NetworkNonceSource,
{
    config: NonceConfig,
    store: Arc<S>,
    network: Arc<N>,
}

impl<S, N> NonceSequencer<S, N>
where
    S: NonceStore,
    N: NetworkNonceSource,
{
    /// Create new nonce sequencer
    pub fn new(config: NonceConfig, store: Arc<S>, network: Arc<N>) -> Self {
        if let Some(value) = config.nonce_override {
            info!(nonce = value, "[ns-01] Nonce override active");
        }
        Self {
            config,
            store,
            network,
        }
    }

    pub fn config(&self) -> &NonceConfig {
        &self.config
    }
}

#[async_trait]
impl<S, N> NonceSequencerApi for NonceSequencer<S, N>
where
    S: NonceStore,
    N: NetworkNonceSource,
{
    async fn get_current_nonce(&self, address: &Address) -> NonceResult<u64> {
        if let Some(value) = self.config.nonce_override {
            debug!(%address, nonce = value, "[ns-01] Using configured nonce override");
            return Ok(value);
        }

        if let Some(record) = self.store.get(address).await? {
            debug!(%address, nonce = record.nonce, "[ns-01] Using stored nonce");
            return Ok(record.nonce);
        }

        self.get_current_nonce_from_network(address).await
    }

    async fn get_current_nonce_from_network(&self, address: &Address) -> NonceResult<u64> {
        let nonce = self.network.pending_nonce_at(address).await.map_err(|e| {
            error!(%address, error = %e, "[ns-01] Can not get nonce from network");
            e
        })?;
        debug!(%address, nonce, "[ns-01] Using network nonce");
        Ok(nonce)
    }

    async fn save_nonce(&self, address: &Address, value: u64) -> NonceResult<u64> {
        self.store
            .upsert(&NonceRecord::new(*address, value))
            .await
            .map_err(|e| {
                error!(%address, nonce = value, error = %e, "[ns-01] Failed to save nonce");
                e
            })?;
        info!(%address, nonce = value, "[ns-01] Saved next nonce");
        Ok(value)
    }
}
