//! # Core Domain Entities
//!
//! Fixed-size byte primitives used across the registrar, plus the coarse
//! operation state reported to RPC clients.
//!
//! All byte primitives render as lowercase `0x`-prefixed hex and parse from
//! hex with or without the prefix.

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::HexParseError;

// Re-export U256 from primitive-types for gas prices
pub use primitive_types::U256;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Length in bytes.
            pub const LEN: usize = $len;

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns true if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = HexParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s
                    .strip_prefix("0x")
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                let decoded = hex::decode(digits).map_err(|e| HexParseError::InvalidHex {
                    input: s.to_string(),
                    reason: e.to_string(),
                })?;
                if decoded.len() != $len {
                    return Err(HexParseError::InvalidLength {
                        expected: $len,
                        actual: decoded.len(),
                    });
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(&decoded);
                Ok(Self(out))
            }
        }
    };
}

fixed_bytes!(
    /// A 20-byte Ethereum-style account address.
    Address,
    20
);

fixed_bytes!(
    /// A 32-byte transaction hash.
    TxHash,
    32
);

fixed_bytes!(
    /// A 32-byte commitment hash published by the commit transaction.
    Commitment,
    32
);

fixed_bytes!(
    /// The 32-byte secret blinding a commit-reveal registration.
    ///
    /// Generated once per queue item and reused verbatim for both the commit
    /// and the register call; a different secret makes the on-chain
    /// commitment unrecoverable.
    Secret,
    32
);

impl Secret {
    /// Draw a fresh secret from the operating system RNG.
    pub fn random() -> Result<Self, rand::Error> {
        let mut bytes = [0u8; 32];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Coarse operation state exposed to RPC clients.
///
/// The fine-grained queue status collapses into one of these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
    /// Still moving through the registration protocol.
    Pending,
    /// Finished successfully.
    Completed,
    /// Finished with a failure.
    Error,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationState::Pending => write!(f, "PENDING"),
            OperationState::Completed => write!(f, "COMPLETED"),
            OperationState::Error => write!(f, "ERROR"),
        }
    }
}
