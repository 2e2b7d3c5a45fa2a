//! # Shared Types Crate
//!
//! This crate contains the primitives and ports shared by every subsystem of
//! the registrar node.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Addresses, hashes, secrets and the chain
//!   handle types are defined once here and nowhere else.
//! - **Opaque Chain Handles**: Subsystems never see an RPC client. They hold
//!   `ChainConnection` / `ControllerHandle` values minted by a gateway.
//! - **Storage as a Port**: `KeyValueStore` is the only persistence
//!   abstraction. Subsystems build typed stores on top of it.

pub mod chain;
pub mod entities;
pub mod errors;
pub mod storage;

pub use chain::*;
pub use entities::*;
pub use errors::*;
pub use storage::{InMemoryKVStore, KeyValueStore};
