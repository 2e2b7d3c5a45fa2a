//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports declared by the
//! subsystems:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   OUTER LAYER (Adapters)                     │
//! │   DevChainGateway, DevLedger, RocksDbStore                   │
//! │                        ↑ implements ↑                        │
//! │                   MIDDLE LAYER (Ports)                       │
//! │   ChainGateway, NetworkNonceSource, KeyValueStore            │
//! │                          ↑ uses ↑                            │
//! │                   INNER LAYER (Domain)                       │
//! │   QueueItem, QueueItemStatus, NonceRecord                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod dev_chain;
pub mod storage;

pub use dev_chain::{compute_commitment, DevChainGateway, DevLedger, NameRecord};
pub use storage::*;
