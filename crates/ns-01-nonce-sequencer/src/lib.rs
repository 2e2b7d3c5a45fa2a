//! # Nonce Sequencer Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Owns the authoritative "next nonce to use" for the administrative account
//! that signs every registrar transaction. Consulted once per transaction
//! submission, and updated only after a transaction is confirmed mined, so a
//! restart resumes from a consistent point instead of colliding with pending
//! transactions.
//!
//! ## Resolution Order
//!
//! | Priority | Source | Purpose |
//! |----------|--------|---------|
//! | 1 | `NonceConfig::nonce_override` | Manual recovery after a stuck nonce |
//! | 2 | Persisted `NonceRecord` | Normal operation |
//! | 3 | Network (mined + pending count) | First run / empty store |
//!
//! ## Caller Contract
//!
//! ```text
//! get_current_nonce(addr) ──sign+submit──→ [tx pending] ──mined──→ save_nonce(addr, n + 1)
//!                                              │
//!                                              └── failed ──→ (nothing saved)
//! ```
//!
//! "Read current nonce" + "submit" + "save after mined" is one unit that must
//! not interleave for the same address. The sequencer holds no lock for it:
//! the registrar runs exactly one transaction-issuing worker.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! adapters/kv_store.rs  - KvNonceStore over shared-types KeyValueStore
//! ports/inbound.rs      - NonceSequencerApi
//! ports/outbound.rs     - NonceStore, NetworkNonceSource
//! domain/               - NonceRecord, NonceError
//! service.rs            - NonceSequencer, NonceConfig
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::KvNonceStore;
pub use domain::*;
pub use ports::inbound::NonceSequencerApi;
pub use ports::outbound::{NetworkNonceSource, NonceStore};
pub use service::{NonceConfig, NonceSequencer};
