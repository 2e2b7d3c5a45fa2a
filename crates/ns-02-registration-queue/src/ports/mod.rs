//! Ports for the Registration Queue subsystem.

pub mod inbound;
pub mod outbound;
