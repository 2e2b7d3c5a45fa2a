//! # Development Chain
//!
//! In-process stand-in for the registrar contracts, used when the chain
//! endpoint is a `dev://` URL and by integration tests.
//!
//! `DevLedger` enforces the rules the registrar depends on:
//! - each account's transactions must carry exactly its next nonce
//! - a register only succeeds if its commitment was committed first
//! - a name can be registered once, and renewed only once registered
//!
//! Rule violations at submission are rejected. Violations discovered at
//! execution drop the transaction: it is reported as not mined and its
//! nonce stays free for the next transaction.
//!
//! A real chain differs here: a reverted transaction is mined and consumes
//! its nonce. Since the queue saves a nonce only after a successful
//! transaction, the stored nonce is stale after a revert on a real chain.
//! The dev ledger cannot reproduce that case, so tests against it do not
//! cover it.
//!
//! `DevChainGateway` implements `ChainGateway` on top of the ledger and takes
//! every nonce from the nonce sequencer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ns_01_nonce_sequencer::{NetworkNonceSource, NonceSequencerApi};
use ns_02_registration_queue::ChainGateway;
use parking_lot::Mutex;
use sha3::{Digest, Keccak256};
use shared_types::{
    Address, AuthOpts, ChainConnection, Commitment, ControllerHandle, GatewayError,
    NameRegistration, TxHandle, TxHash, U256,
};
use tracing::{debug, info, warn};

/// Suggested gas price reported by the development ledger (1 gwei).
pub const DEV_GAS_PRICE_WEI: u64 = 1_000_000_000;

/// Commitment hash over the registration parameters.
///
/// keccak256 over the fields in order, each string length-prefixed so that
/// adjacent fields cannot be shifted into one another.
pub fn compute_commitment(registration: &NameRegistration<'_>) -> Commitment {
    let mut hasher = Keccak256::new();
    absorb(&mut hasher, registration.name.as_bytes());
    absorb(&mut hasher, registration.account.as_bytes());
    absorb(&mut hasher, registration.secret.as_bytes());
    absorb(&mut hasher, registration.full_name.as_bytes());
    absorb(&mut hasher, registration.owner_any_address.as_bytes());
    absorb(&mut hasher, registration.space_id.as_bytes());
    Commitment(hasher.finalize().into())
}

fn absorb(hasher: &mut Keccak256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// A name owned on the development ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub owner: Address,
    pub owner_any_address: String,
    pub space_id: String,
    /// Block of the registration or the last renewal.
    pub updated_block: u64,
    /// Seconds of registration purchased by renewals.
    pub renewed_sec: u64,
}

#[derive(Debug, Clone)]
struct DevTx {
    handle: TxHandle,
    success: bool,
}

#[derive(Default)]
struct LedgerState {
    account_nonces: HashMap<Address, u64>,
    commitments: HashMap<Commitment, u64>,
    names: HashMap<String, NameRecord>,
    txs: HashMap<TxHash, DevTx>,
    block: u64,
}

impl LedgerState {
    /// Accept a transaction in a fresh block. Only a successful transaction
    /// consumes its nonce.
    fn include(&mut self, from: Address, nonce: u64, success: bool) -> Result<TxHandle, GatewayError> {
        let expected = self.account_nonces.get(&from).copied().unwrap_or(0);
        if nonce < expected {
            return Err(GatewayError::Rejected(format!(
                "nonce too low: got {nonce}, expected {expected}"
            )));
        }
        if nonce > expected {
            return Err(GatewayError::Rejected(format!(
                "nonce too high: got {nonce}, expected {expected}"
            )));
        }

        self.block += 1;
        if success {
            self.account_nonces.insert(from, expected + 1);
        }

        let mut hasher = Keccak256::new();
        hasher.update(from.as_bytes());
        hasher.update(nonce.to_be_bytes());
        hasher.update(self.block.to_be_bytes());
        let handle = TxHandle {
            hash: TxHash(hasher.finalize().into()),
            from,
            nonce,
        };
        self.txs.insert(
            handle.hash,
            DevTx {
                handle: handle.clone(),
                success,
            },
        );
        Ok(handle)
    }
}

/// Simulated ledger holding accounts, commitments and names.
pub struct DevLedger {
    state: Mutex<LedgerState>,
    block_time: Duration,
}

impl DevLedger {
    pub fn new(block_time: Duration) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            block_time,
        }
    }

    /// Current owner record of `full_name`.
    pub fn name(&self, full_name: &str) -> Option<NameRecord> {
        self.state.lock().names.get(full_name).cloned()
    }

    /// Number of successful transactions from `account`.
    pub fn mined_nonce(&self, account: &Address) -> u64 {
        self.state
            .lock()
            .account_nonces
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    fn commit(&self, from: Address, nonce: u64, commitment: Commitment) -> Result<TxHandle, GatewayError> {
        let mut state = self.state.lock();
        let tx = state.include(from, nonce, true)?;
        let block = state.block;
        state.commitments.insert(commitment, block);
        Ok(tx)
    }

    fn register(
        &self,
        from: Address,
        nonce: u64,
        registration: &NameRegistration<'_>,
    ) -> Result<TxHandle, GatewayError> {
        let commitment = compute_commitment(registration);
        let mut state = self.state.lock();

        let committed = state.commitments.contains_key(&commitment);
        let available = !state.names.contains_key(registration.full_name);
        let success = committed && available;
        if !committed {
            warn!(name = registration.full_name, "[dev-chain] Register without matching commitment");
        } else if !available {
            warn!(name = registration.full_name, "[dev-chain] Name already registered");
        }

        let tx = state.include(from, nonce, success)?;
        if success {
            state.commitments.remove(&commitment);
            let block = state.block;
            state.names.insert(
                registration.full_name.to_string(),
                NameRecord {
                    owner: registration.account,
                    owner_any_address: registration.owner_any_address.to_string(),
                    space_id: registration.space_id.to_string(),
                    updated_block: block,
                    renewed_sec: 0,
                },
            );
        }
        Ok(tx)
    }

    fn renew(
        &self,
        from: Address,
        nonce: u64,
        full_name: &str,
        duration_sec: u64,
    ) -> Result<TxHandle, GatewayError> {
        let mut state = self.state.lock();
        let success = state.names.contains_key(full_name);
        if !success {
            warn!(name = full_name, "[dev-chain] Renew of unregistered name");
        }
        let tx = state.include(from, nonce, success)?;
        let block = state.block;
        if let Some(record) = state.names.get_mut(full_name) {
            record.updated_block = block;
            record.renewed_sec = record.renewed_sec.saturating_add(duration_sec);
        }
        Ok(tx)
    }

    fn tx(&self, hash: &TxHash) -> Option<DevTx> {
        self.state.lock().txs.get(hash).cloned()
    }
}

#[async_trait]
impl NetworkNonceSource for DevLedger {
    async fn pending_nonce_at(&self, address: &Address) -> Result<u64, GatewayError> {
        // transactions are mined on submission, so nothing is ever pending
        Ok(self.mined_nonce(address))
    }
}

/// `ChainGateway` backed by a `DevLedger`.
pub struct DevChainGateway {
    ledger: Arc<DevLedger>,
    nonces: Arc<dyn NonceSequencerApi>,
    endpoint: String,
    admin: Address,
    controller: Address,
    gas_limit: u64,
}

impl DevChainGateway {
    pub fn new(
        ledger: Arc<DevLedger>,
        nonces: Arc<dyn NonceSequencerApi>,
        endpoint: impl Into<String>,
        admin: Address,
        controller: Address,
        gas_limit: u64,
    ) -> Self {
        Self {
            ledger,
            nonces,
            endpoint: endpoint.into(),
            admin,
            controller,
            gas_limit,
        }
    }

    fn check_controller(&self, controller: &ControllerHandle) -> Result<(), GatewayError> {
        if controller.address != self.controller {
            return Err(GatewayError::Controller(format!(
                "unknown controller {}",
                controller.address
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainGateway for DevChainGateway {
    async fn create_connection(&self) -> Result<ChainConnection, GatewayError> {
        Ok(ChainConnection {
            endpoint: self.endpoint.clone(),
        })
    }

    async fn connect_to_controller(
        &self,
        conn: &ChainConnection,
    ) -> Result<ControllerHandle, GatewayError> {
        if conn.endpoint != self.endpoint {
            return Err(GatewayError::Connection(format!(
                "unknown endpoint {}",
                conn.endpoint
            )));
        }
        Ok(ControllerHandle {
            address: self.controller,
        })
    }

    async fn make_commitment(
        &self,
        registration: &NameRegistration<'_>,
        controller: &ControllerHandle,
    ) -> Result<Commitment, GatewayError> {
        self.check_controller(controller)?;
        Ok(compute_commitment(registration))
    }

    async fn generate_auth_opts_for_admin(
        &self,
        _conn: &ChainConnection,
    ) -> Result<AuthOpts, GatewayError> {
        let nonce = self
            .nonces
            .get_current_nonce(&self.admin)
            .await
            .map_err(|e| GatewayError::AuthOptions(e.to_string()))?;
        let gas_price = U256::from(DEV_GAS_PRICE_WEI) * U256::from(2u8);
        debug!(nonce, %gas_price, "[dev-chain] Auth options for admin");
        Ok(AuthOpts {
            from: self.admin,
            nonce,
            gas_limit: self.gas_limit,
            gas_price,
        })
    }

    async fn commit(
        &self,
        auth: &AuthOpts,
        commitment: &Commitment,
        controller: &ControllerHandle,
    ) -> Result<TxHandle, GatewayError> {
        self.check_controller(controller)?;
        let tx = self.ledger.commit(auth.from, auth.nonce, *commitment)?;
        info!(tx = %tx.hash, nonce = tx.nonce, "[dev-chain] Commit accepted");
        Ok(tx)
    }

    async fn register(
        &self,
        auth: &AuthOpts,
        registration: &NameRegistration<'_>,
        controller: &ControllerHandle,
    ) -> Result<TxHandle, GatewayError> {
        self.check_controller(controller)?;
        let tx = self.ledger.register(auth.from, auth.nonce, registration)?;
        info!(tx = %tx.hash, nonce = tx.nonce, "[dev-chain] Register accepted");
        Ok(tx)
    }

    async fn renew_name(
        &self,
        auth: &AuthOpts,
        full_name: &str,
        duration_sec: u64,
        controller: &ControllerHandle,
    ) -> Result<TxHandle, GatewayError> {
        self.check_controller(controller)?;
        let tx = self
            .ledger
            .renew(auth.from, auth.nonce, full_name, duration_sec)?;
        info!(tx = %tx.hash, nonce = tx.nonce, "[dev-chain] Renew accepted");
        Ok(tx)
    }

    async fn tx_by_hash(
        &self,
        _conn: &ChainConnection,
        hash: &TxHash,
    ) -> Result<TxHandle, GatewayError> {
        self.ledger
            .tx(hash)
            .map(|tx| tx.handle)
            .ok_or_else(|| GatewayError::TxNotFound(hash.to_string()))
    }

    async fn wait_mined(
        &self,
        _conn: &ChainConnection,
        tx: &TxHandle,
    ) -> Result<bool, GatewayError> {
        let Some(mined) = self.ledger.tx(&tx.hash) else {
            return Err(GatewayError::TxNotFound(tx.hash.to_string()));
        };
        tokio::time::sleep(self.ledger.block_time).await;
        Ok(mined.success)
    }
}
