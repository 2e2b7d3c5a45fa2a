//! # Domain Layer - Registration Queue
//!
//! - `entities`: QueueItem, ItemType, request types
//! - `status`: QueueItemStatus and its transition table
//! - `errors`: QueueError enumeration

pub mod entities;
pub mod errors;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use status::*;
