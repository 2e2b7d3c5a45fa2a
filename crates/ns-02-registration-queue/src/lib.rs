//! # Registration Queue Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Durable job queue that drives every name registration through the
//! two-transaction commit-reveal protocol, and every renewal through its
//! single transaction. Each item is persisted before it is announced, every
//! status change is persisted before the next step runs, and a startup
//! resume scan picks up whatever a previous process left mid-flight.
//!
//! ## Flow
//!
//! ```text
//! add_new_request ──persist(Initial)──→ DispatchLane(index) ──→ worker
//!                                                                 │
//!                                      re-read item by index ←────┘
//!                                                 │
//!        ┌──────────── ItemProcessor::name_register ────────────┐
//!        │  step → persist status → step → persist status → ... │
//!        └──────────────────────────────────────────────────────┘
//! ```
//!
//! The lane carries only indices and is never persisted. The store is the
//! source of truth.
//!
//! ## Concurrency
//!
//! Exactly one worker per process, started by `run` after the resume scan
//! completes. The worker is the only issuer of admin transactions, so the
//! nonce sequencer needs no per-address lock.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! adapters/kv_store.rs  - KvQueueItemStore over shared-types KeyValueStore
//! ports/inbound.rs      - RegistrationQueueApi
//! ports/outbound.rs     - QueueItemStore, ChainGateway, TimeSource
//! domain/               - QueueItem, QueueItemStatus + transition table, QueueError
//! processor.rs          - ItemProcessor (state-machine driver)
//! lane.rs               - DispatchLane (bounded notification channel)
//! worker.rs             - background worker loop
//! service.rs            - RegistrationQueue, QueueConfig
//! ```

pub mod adapters;
pub mod domain;
pub mod lane;
pub mod ports;
pub mod processor;
pub mod service;
pub mod worker;

pub use adapters::KvQueueItemStore;
pub use domain::*;
pub use lane::{DispatchLane, DEFAULT_LANE_CAPACITY};
pub use ports::inbound::RegistrationQueueApi;
pub use ports::outbound::{ChainGateway, QueueItemStore, SystemTimeSource, TimeSource};
pub use processor::ItemProcessor;
pub use service::{QueueConfig, RegistrationQueue};
