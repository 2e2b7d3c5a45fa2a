//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors parsing a fixed-size hex primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexParseError {
    /// Input is not valid hex.
    #[error("Invalid hex '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    /// Input decoded to the wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors reported by a chain gateway.
///
/// The queue never inspects these beyond logging them; every gateway error
/// fails the protocol step that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Could not reach the chain endpoint.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Could not bind to the registrar controller contract.
    #[error("Controller unavailable: {0}")]
    Controller(String),

    /// Transaction was rejected at submission.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Transaction hash is unknown to the node.
    #[error("Transaction not found: {0}")]
    TxNotFound(String),

    /// Building signing options failed (key, gas price or nonce lookup).
    #[error("Auth options unavailable: {0}")]
    AuthOptions(String),

    /// Waiting for the transaction was cut short.
    #[error("Wait for mining aborted: {0}")]
    WaitAborted(String),

    /// Any other gateway-side failure.
    #[error("Gateway error: {0}")]
    Other(String),
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// Underlying storage I/O failed.
    #[error("I/O error: {message}")]
    IOError { message: String },

    /// Stored bytes could not be decoded.
    #[error("Corrupted value under key {key}: {message}")]
    Corrupted { key: String, message: String },
}
