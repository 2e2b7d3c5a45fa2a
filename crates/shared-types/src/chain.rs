//! # Chain Handle Types
//!
//! Values exchanged with a chain gateway. They carry just enough information
//! for the queue to persist and resume work: the gateway owns the RPC client,
//! the signing key and the ABI encoding.

use serde::{Deserialize, Serialize};

use crate::entities::{Address, Secret, TxHash, U256};

/// An open connection to a chain endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConnection {
    /// Endpoint the connection was opened against.
    pub endpoint: String,
}

/// A bound instance of the registrar controller contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerHandle {
    /// Controller contract address.
    pub address: Address,
}

/// Signing options for one admin transaction.
///
/// `nonce` is the sequence number the transaction will be signed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOpts {
    /// Signing account.
    pub from: Address,
    /// Nonce embedded in the transaction.
    pub nonce: u64,
    /// Gas limit in units.
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: U256,
}

/// A submitted (or re-fetched) transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    /// Transaction hash.
    pub hash: TxHash,
    /// Signing account.
    pub from: Address,
    /// Sender nonce.
    pub nonce: u64,
}

/// Arguments shared by the commitment computation and the register call.
///
/// Both calls must see byte-identical values; building them from one struct
/// keeps them in lockstep.
#[derive(Debug, Clone, Copy)]
pub struct NameRegistration<'a> {
    /// Name without the top-level domain.
    pub name: &'a str,
    /// Account receiving the name.
    pub account: Address,
    /// Commit-reveal secret.
    pub secret: &'a Secret,
    /// Full name including the top-level domain.
    pub full_name: &'a str,
    /// Owner's Any-network identity.
    pub owner_any_address: &'a str,
    /// Space bound to the name, may be empty.
    pub space_id: &'a str,
}
