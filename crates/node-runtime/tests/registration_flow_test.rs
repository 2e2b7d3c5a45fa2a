//! End-to-end registration flow against the development ledger.
//!
//! Each test wires the real container (sequencer, queue, gateway, store)
//! with a zero block time so items complete as fast as the worker runs.

use std::sync::Arc;
use std::time::Duration;

use node_runtime::adapters::DevLedger;
use node_runtime::{NodeConfig, NodeRuntime, SubsystemContainer};
use ns_01_nonce_sequencer::NonceSequencerApi;
use ns_02_registration_queue::{NameRegisterRequest, NameRenewRequest, RegistrationQueueApi};
use shared_types::{Address, InMemoryKVStore, KeyValueStore, OperationState};

const ADMIN: Address = Address([0xAD; 20]);
const OWNER: &str = "0x61d1eeE7FBF652482DEa98A1Df591C626bA09a60";

fn test_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.storage.in_memory = true;
    config.chain.admin_address = ADMIN;
    config.chain.block_time_ms = 0;
    config.queue.shutdown_timeout_secs = 5;
    config
}

fn register_request(full_name: &str) -> NameRegisterRequest {
    NameRegisterRequest {
        full_name: full_name.to_string(),
        owner_any_address: "12D3KooWA8EXV3KjBxEU5EnsPfneLx84vMWAtTBQBeyooN82KSuS".to_string(),
        owner_eth_address: OWNER.to_string(),
        space_id: "bafyreiaxb7".to_string(),
    }
}

async fn wait_for_state(
    container: &SubsystemContainer,
    operation_id: i64,
    expected: OperationState,
) {
    let queue = &container.registration_queue;
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if queue.get_request_status(operation_id).await.unwrap() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(
        result.is_ok(),
        "operation {operation_id} never reached {expected}"
    );
}

#[tokio::test]
async fn test_register_completes_and_saves_nonce() {
    let runtime = NodeRuntime::new(test_config()).unwrap();
    runtime.start().await.unwrap();
    let container = runtime.container();

    let id = container
        .registration_queue
        .add_new_request(register_request("hello.any"))
        .await
        .unwrap();
    assert_eq!(id, 0);
    wait_for_state(&container, id, OperationState::Completed).await;

    let record = container.ledger.name("hello.any").unwrap();
    assert_eq!(record.owner, OWNER.parse::<Address>().unwrap());
    assert_eq!(record.space_id, "bafyreiaxb7");

    // commit used nonce 0 and register nonce 1
    assert_eq!(container.ledger.mined_nonce(&ADMIN), 2);
    assert_eq!(
        container.nonce_sequencer.get_current_nonce(&ADMIN).await.unwrap(),
        2
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_name_ends_in_error() {
    let runtime = NodeRuntime::new(test_config()).unwrap();
    runtime.start().await.unwrap();
    let container = runtime.container();
    let queue = &container.registration_queue;

    let first = queue.add_new_request(register_request("taken.any")).await.unwrap();
    wait_for_state(&container, first, OperationState::Completed).await;

    let second = queue.add_new_request(register_request("taken.any")).await.unwrap();
    wait_for_state(&container, second, OperationState::Error).await;

    // the dropped register left its nonce free for the next item
    let third = queue.add_new_request(register_request("free.any")).await.unwrap();
    wait_for_state(&container, third, OperationState::Completed).await;
    assert!(container.ledger.name("free.any").is_some());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_renew_after_register() {
    let runtime = NodeRuntime::new(test_config()).unwrap();
    runtime.start().await.unwrap();
    let container = runtime.container();
    let queue = &container.registration_queue;

    let register = queue.add_new_request(register_request("renewme.any")).await.unwrap();
    let renew = queue
        .add_renew_request(NameRenewRequest {
            full_name: "renewme.any".to_string(),
            duration_sec: 31_536_000,
        })
        .await
        .unwrap();
    assert_eq!(renew, register + 1);

    wait_for_state(&container, register, OperationState::Completed).await;
    wait_for_state(&container, renew, OperationState::Completed).await;
    assert_eq!(
        container.ledger.name("renewme.any").unwrap().renewed_sec,
        31_536_000
    );

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_restart_resumes_queued_items() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKVStore::new());
    let ledger = Arc::new(DevLedger::new(Duration::ZERO));

    // First run accepts requests but never starts the worker.
    let mut paused = test_config();
    paused.queue.skip_background_processing = true;
    let first = NodeRuntime::from_container(
        SubsystemContainer::with_ledger(paused, Arc::clone(&kv), Arc::clone(&ledger)).unwrap(),
    );
    first.start().await.unwrap();
    let a = first
        .container()
        .registration_queue
        .add_new_request(register_request("first.any"))
        .await
        .unwrap();
    let b = first
        .container()
        .registration_queue
        .add_new_request(register_request("second.any"))
        .await
        .unwrap();
    assert_eq!(
        first
            .container()
            .registration_queue
            .get_request_status(a)
            .await
            .unwrap(),
        OperationState::Pending
    );
    first.shutdown().await.unwrap();

    // Second run over the same store picks both up.
    let second = NodeRuntime::from_container(
        SubsystemContainer::with_ledger(test_config(), kv, Arc::clone(&ledger)).unwrap(),
    );
    second.start().await.unwrap();
    let container = second.container();
    wait_for_state(&container, a, OperationState::Completed).await;
    wait_for_state(&container, b, OperationState::Completed).await;

    assert!(ledger.name("first.any").is_some());
    assert!(ledger.name("second.any").is_some());
    assert_eq!(ledger.mined_nonce(&ADMIN), 4);

    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_skip_processing_never_touches_chain() {
    let mut config = test_config();
    config.queue.skip_processing = true;
    let runtime = NodeRuntime::new(config).unwrap();
    runtime.start().await.unwrap();
    let container = runtime.container();

    let id = container
        .registration_queue
        .add_new_request(register_request("skipped.any"))
        .await
        .unwrap();
    wait_for_state(&container, id, OperationState::Completed).await;

    assert_eq!(container.ledger.name("skipped.any"), None);
    assert_eq!(container.ledger.mined_nonce(&ADMIN), 0);

    runtime.shutdown().await.unwrap();
}
