//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: Subsystems declare ports, this crate supplies
//!   the adapters
//! - **Single Store**: One `KeyValueStore` backs every subsystem, records are
//!   separated by key prefix

pub mod adapters;
pub mod container;
pub mod runtime;

pub use container::{ConfigError, ContainerError, NodeConfig, SubsystemContainer};
pub use runtime::NodeRuntime;
