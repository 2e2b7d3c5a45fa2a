//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the registration queue requires the host to implement.
//!
//! - `QueueItemStore`: durable item storage (production: `KvQueueItemStore`)
//! - `ChainGateway`: chain reads, admin signing options, transaction submission
//! - `TimeSource`: wall clock for item timestamps

use async_trait::async_trait;
use shared_types::{
    AuthOpts, ChainConnection, Commitment, ControllerHandle, GatewayError, NameRegistration,
    TxHandle, TxHash,
};

use crate::domain::{QueueItem, QueueItemStatus, QueueResult};

/// Durable storage for queue items keyed by `index`.
///
/// No multi-item transactions: every write replaces exactly one item.
#[async_trait]
pub trait QueueItemStore: Send + Sync {
    /// Number of stored items. Next index to assign.
    async fn count(&self) -> QueueResult<u64>;

    /// Store a new item. Fails with `DuplicateIndex` if the index is taken.
    async fn insert(&self, item: &QueueItem) -> QueueResult<()>;

    /// Point lookup by index.
    async fn get_by_index(&self, index: i64) -> QueueResult<Option<QueueItem>>;

    /// Atomically replace an existing item. Fails with `ItemNotFound` if absent.
    async fn replace(&self, item: &QueueItem) -> QueueResult<()>;

    /// Items currently in `status`, ascending by index.
    async fn find_by_status(&self, status: QueueItemStatus) -> QueueResult<Vec<QueueItem>>;

    /// Flush buffered writes before shutdown.
    async fn flush(&self) -> QueueResult<()>;
}

/// Chain gateway used by the state-machine driver.
///
/// The gateway owns the RPC client, the admin key and ABI encoding.
/// `generate_auth_opts_for_admin` is expected to take its nonce from the
/// nonce sequencer.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    async fn create_connection(&self) -> Result<ChainConnection, GatewayError>;

    async fn connect_to_controller(
        &self,
        conn: &ChainConnection,
    ) -> Result<ControllerHandle, GatewayError>;

    /// Commitment hash over the registration parameters.
    async fn make_commitment(
        &self,
        registration: &NameRegistration<'_>,
        controller: &ControllerHandle,
    ) -> Result<Commitment, GatewayError>;

    /// Signing options for the next admin transaction.
    async fn generate_auth_opts_for_admin(
        &self,
        conn: &ChainConnection,
    ) -> Result<AuthOpts, GatewayError>;

    async fn commit(
        &self,
        auth: &AuthOpts,
        commitment: &Commitment,
        controller: &ControllerHandle,
    ) -> Result<TxHandle, GatewayError>;

    async fn register(
        &self,
        auth: &AuthOpts,
        registration: &NameRegistration<'_>,
        controller: &ControllerHandle,
    ) -> Result<TxHandle, GatewayError>;

    async fn renew_name(
        &self,
        auth: &AuthOpts,
        full_name: &str,
        duration_sec: u64,
        controller: &ControllerHandle,
    ) -> Result<TxHandle, GatewayError>;

    /// Re-fetch a previously submitted transaction.
    async fn tx_by_hash(
        &self,
        conn: &ChainConnection,
        hash: &TxHash,
    ) -> Result<TxHandle, GatewayError>;

    /// Block until `tx` is mined. `Ok(false)` if it was mined but failed.
    async fn wait_mined(&self, conn: &ChainConnection, tx: &TxHandle)
        -> Result<bool, GatewayError>;
}

/// Abstract interface for time operations.
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> u64;
}

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Mock implementations for testing
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use ns_01_nonce_sequencer::{NonceError, NonceResult, NonceSequencerApi};
    use parking_lot::Mutex;
    use shared_types::{Address, KVStoreError, Secret, U256};

    /// Admin account the mock gateway signs with.
    pub const MOCK_ADMIN: Address = Address([0xAD; 20]);

    /// Gateway calls recorded by `MockGateway`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum GatewayCall {
        CreateConnection,
        ConnectToController,
        MakeCommitment,
        AuthOpts,
        Commit,
        Register,
        RenewName,
        TxByHash,
        WaitMined,
    }

    #[derive(Default)]
    struct MockGatewayState {
        calls: Vec<GatewayCall>,
        next_tx: u64,
        next_nonce: u64,
        known_txs: HashMap<TxHash, TxHandle>,
        reverted: HashSet<TxHash>,
        commitment_secrets: Vec<Secret>,
        register_secrets: Vec<Secret>,
        fail_commit: bool,
        revert_commit: bool,
        fail_register: bool,
        fail_connection: bool,
    }

    /// Call-counting chain gateway. Every transaction it knows is mined
    /// successfully unless marked reverted.
    #[derive(Default)]
    pub struct MockGateway {
        state: Mutex<MockGatewayState>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// `commit` returns an error.
        pub fn fail_commit(&self) {
            self.state.lock().fail_commit = true;
        }

        /// `commit` succeeds but the transaction reverts.
        pub fn revert_commit(&self) {
            self.state.lock().revert_commit = true;
        }

        /// `register` returns an error.
        pub fn fail_register(&self) {
            self.state.lock().fail_register = true;
        }

        /// `create_connection` returns an error.
        pub fn fail_connection(&self) {
            self.state.lock().fail_connection = true;
        }

        /// Make a transaction submitted by an earlier process visible.
        pub fn seed_tx(&self, hash: TxHash, nonce: u64) {
            self.state.lock().known_txs.insert(
                hash,
                TxHandle {
                    hash,
                    from: MOCK_ADMIN,
                    nonce,
                },
            );
        }

        pub fn calls(&self) -> Vec<GatewayCall> {
            self.state.lock().calls.clone()
        }

        pub fn count(&self, call: GatewayCall) -> usize {
            self.state.lock().calls.iter().filter(|c| **c == call).count()
        }

        pub fn commitment_secrets(&self) -> Vec<Secret> {
            self.state.lock().commitment_secrets.clone()
        }

        pub fn register_secrets(&self) -> Vec<Secret> {
            self.state.lock().register_secrets.clone()
        }

        fn record(&self, call: GatewayCall) {
            self.state.lock().calls.push(call);
        }

        fn submit(&self, auth: &AuthOpts, reverted: bool) -> TxHandle {
            let mut state = self.state.lock();
            state.next_tx += 1;
            let mut bytes = [0u8; 32];
            bytes[24..].copy_from_slice(&state.next_tx.to_be_bytes());
            let tx = TxHandle {
                hash: TxHash(bytes),
                from: auth.from,
                nonce: auth.nonce,
            };
            state.known_txs.insert(tx.hash, tx.clone());
            if reverted {
                state.reverted.insert(tx.hash);
            }
            tx
        }
    }

    #[async_trait]
    impl ChainGateway for MockGateway {
        async fn create_connection(&self) -> Result<ChainConnection, GatewayError> {
            self.record(GatewayCall::CreateConnection);
            if self.state.lock().fail_connection {
                return Err(GatewayError::Connection("mock endpoint down".into()));
            }
            Ok(ChainConnection {
                endpoint: "mock://chain".into(),
            })
        }

        async fn connect_to_controller(
            &self,
            _conn: &ChainConnection,
        ) -> Result<ControllerHandle, GatewayError> {
            self.record(GatewayCall::ConnectToController);
            Ok(ControllerHandle {
                address: Address([0xC0; 20]),
            })
        }

        async fn make_commitment(
            &self,
            registration: &NameRegistration<'_>,
            _controller: &ControllerHandle,
        ) -> Result<Commitment, GatewayError> {
            self.record(GatewayCall::MakeCommitment);
            self.state
                .lock()
                .commitment_secrets
                .push(*registration.secret);
            Ok(Commitment(registration.secret.0))
        }

        async fn generate_auth_opts_for_admin(
            &self,
            _conn: &ChainConnection,
        ) -> Result<AuthOpts, GatewayError> {
            self.record(GatewayCall::AuthOpts);
            let mut state = self.state.lock();
            let nonce = state.next_nonce;
            state.next_nonce += 1;
            Ok(AuthOpts {
                from: MOCK_ADMIN,
                nonce,
                gas_limit: 500_000,
                gas_price: U256::from(2_000_000_000u64),
            })
        }

        async fn commit(
            &self,
            auth: &AuthOpts,
            _commitment: &Commitment,
            _controller: &ControllerHandle,
        ) -> Result<TxHandle, GatewayError> {
            self.record(GatewayCall::Commit);
            let (fail, revert) = {
                let state = self.state.lock();
                (state.fail_commit, state.revert_commit)
            };
            if fail {
                return Err(GatewayError::Rejected("commit rejected".into()));
            }
            Ok(self.submit(auth, revert))
        }

        async fn register(
            &self,
            auth: &AuthOpts,
            registration: &NameRegistration<'_>,
            _controller: &ControllerHandle,
        ) -> Result<TxHandle, GatewayError> {
            self.record(GatewayCall::Register);
            {
                let mut state = self.state.lock();
                state.register_secrets.push(*registration.secret);
                if state.fail_register {
                    return Err(GatewayError::Rejected("register rejected".into()));
                }
            }
            Ok(self.submit(auth, false))
        }

        async fn renew_name(
            &self,
            auth: &AuthOpts,
            _full_name: &str,
            _duration_sec: u64,
            _controller: &ControllerHandle,
        ) -> Result<TxHandle, GatewayError> {
            self.record(GatewayCall::RenewName);
            Ok(self.submit(auth, false))
        }

        async fn tx_by_hash(
            &self,
            _conn: &ChainConnection,
            hash: &TxHash,
        ) -> Result<TxHandle, GatewayError> {
            self.record(GatewayCall::TxByHash);
            self.state
                .lock()
                .known_txs
                .get(hash)
                .cloned()
                .ok_or_else(|| GatewayError::TxNotFound(hash.to_string()))
        }

        async fn wait_mined(
            &self,
            _conn: &ChainConnection,
            tx: &TxHandle,
        ) -> Result<bool, GatewayError> {
            self.record(GatewayCall::WaitMined);
            Ok(!self.state.lock().reverted.contains(&tx.hash))
        }
    }

    /// Nonce sequencer that records every `save_nonce`.
    #[derive(Default)]
    pub struct RecordingNonces {
        saved: Mutex<Vec<(Address, u64)>>,
        fail_save: Mutex<bool>,
    }

    impl RecordingNonces {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_save(&self) {
            *self.fail_save.lock() = true;
        }

        pub fn saved(&self) -> Vec<(Address, u64)> {
            self.saved.lock().clone()
        }
    }

    #[async_trait]
    impl NonceSequencerApi for RecordingNonces {
        async fn get_current_nonce(&self, _address: &Address) -> NonceResult<u64> {
            Ok(0)
        }

        async fn get_current_nonce_from_network(&self, _address: &Address) -> NonceResult<u64> {
            Ok(0)
        }

        async fn save_nonce(&self, address: &Address, value: u64) -> NonceResult<u64> {
            if *self.fail_save.lock() {
                return Err(NonceError::Store(KVStoreError::IOError {
                    message: "nonce store down".into(),
                }));
            }
            self.saved.lock().push((*address, value));
            Ok(value)
        }
    }

    /// Time source returning a fixed timestamp.
    pub struct FixedTimeSource(pub u64);

    impl TimeSource for FixedTimeSource {
        fn now(&self) -> u64 {
            self.0
        }
    }
}
