//! Ports layer for the Nonce Sequencer subsystem.
//!
//! - Inbound (Driving) ports: API exposed to transaction issuers
//! - Outbound (Driven) ports: store and network dependencies

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
