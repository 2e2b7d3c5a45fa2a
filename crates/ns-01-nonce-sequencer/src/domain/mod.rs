//! # Domain Layer - Nonce Sequencer
//!
//! - `entities`: NonceRecord
//! - `errors`: NonceError enumeration

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
