//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Every value has a development default and can be overridden from an
//! `NS_*` environment variable:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NS_DATA_DIR` | `storage.data_dir` |
//! | `NS_IN_MEMORY` | `storage.in_memory` |
//! | `NS_CHAIN_ENDPOINT` | `chain.endpoint` |
//! | `NS_ADMIN_ADDRESS` | `chain.admin_address` |
//! | `NS_CONTROLLER_ADDRESS` | `chain.controller_address` |
//! | `NS_GAS_LIMIT` | `chain.gas_limit` |
//! | `NS_BLOCK_TIME_MS` | `chain.block_time_ms` |
//! | `NS_NONCE_OVERRIDE` | `nonce.nonce_override` |
//! | `NS_LANE_CAPACITY` | `queue.lane_capacity` |
//! | `NS_ENQUEUE_TIMEOUT_MS` | `queue.enqueue_timeout_ms` |
//! | `NS_SKIP_PROCESSING` | `queue.skip_processing` |
//! | `NS_SKIP_BACKGROUND_PROCESSING` | `queue.skip_background_processing` |
//! | `NS_SHUTDOWN_TIMEOUT_SECS` | `queue.shutdown_timeout_secs` |
//!
//! ## Requirements
//!
//! - `admin_address` MUST NOT be the zero address
//! - `lane_capacity` MUST be at least 1

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ns_01_nonce_sequencer::NonceConfig;
use ns_02_registration_queue::{QueueConfig, DEFAULT_LANE_CAPACITY};
use shared_types::Address;
use thiserror::Error;
use tracing::info;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Chain gateway configuration.
    pub chain: ChainConfig,
    /// Nonce sequencer configuration.
    pub nonce: NonceSettings,
    /// Registration queue configuration.
    pub queue: QueueSettings,
}

impl NodeConfig {
    /// Defaults overridden by `NS_*` environment variables.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Self::load_from(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = NodeConfig::default();

        if let Some(dir) = lookup("NS_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        override_parsed(&lookup, "NS_IN_MEMORY", &mut config.storage.in_memory)?;

        if let Some(endpoint) = lookup("NS_CHAIN_ENDPOINT") {
            config.chain.endpoint = endpoint;
        }
        override_parsed(&lookup, "NS_ADMIN_ADDRESS", &mut config.chain.admin_address)?;
        override_parsed(
            &lookup,
            "NS_CONTROLLER_ADDRESS",
            &mut config.chain.controller_address,
        )?;
        override_parsed(&lookup, "NS_GAS_LIMIT", &mut config.chain.gas_limit)?;
        override_parsed(&lookup, "NS_BLOCK_TIME_MS", &mut config.chain.block_time_ms)?;

        if let Some(raw) = lookup("NS_NONCE_OVERRIDE") {
            let value = parse_var("NS_NONCE_OVERRIDE", &raw)?;
            info!(nonce = value, "Loaded nonce override from environment");
            config.nonce.nonce_override = Some(value);
        }

        override_parsed(&lookup, "NS_LANE_CAPACITY", &mut config.queue.lane_capacity)?;
        override_parsed(
            &lookup,
            "NS_ENQUEUE_TIMEOUT_MS",
            &mut config.queue.enqueue_timeout_ms,
        )?;
        override_parsed(&lookup, "NS_SKIP_PROCESSING", &mut config.queue.skip_processing)?;
        override_parsed(
            &lookup,
            "NS_SKIP_BACKGROUND_PROCESSING",
            &mut config.queue.skip_background_processing,
        )?;
        override_parsed(
            &lookup,
            "NS_SHUTDOWN_TIMEOUT_SECS",
            &mut config.queue.shutdown_timeout_secs,
        )?;

        Ok(config)
    }

    /// Validate configuration before the node starts.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the admin address is the zero address
    /// - the lane capacity is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.admin_address.is_zero() {
            return Err(ConfigError::ZeroAdminAddress);
        }
        if self.queue.lane_capacity == 0 {
            return Err(ConfigError::ZeroLaneCapacity);
        }
        Ok(())
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn override_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(var) {
        *target = parse_var(var, &raw)?;
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Admin address is not set (zero value).
    #[error("Admin address is the zero address. Set NS_ADMIN_ADDRESS.")]
    ZeroAdminAddress,

    /// Lane capacity is zero.
    #[error("Lane capacity must be at least 1")]
    ZeroLaneCapacity,

    /// An environment variable could not be parsed.
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the RocksDB store.
    pub data_dir: PathBuf,
    /// Use the in-memory store even when RocksDB is compiled in.
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            in_memory: false,
        }
    }
}

/// Chain gateway configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Chain endpoint. `dev://` endpoints use the in-process ledger.
    pub endpoint: String,
    /// Account signing every registrar transaction.
    pub admin_address: Address,
    /// Registrar controller contract.
    pub controller_address: Address,
    /// Gas limit for admin transactions.
    pub gas_limit: u64,
    /// Simulated block time of the development ledger.
    pub block_time_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            endpoint: "dev://local".to_string(),
            admin_address: Address::default(), // MUST be overridden
            controller_address: Address([0xC0; 20]),
            gas_limit: 500_000,
            block_time_ms: 1_000,
        }
    }
}

/// Nonce sequencer settings.
#[derive(Debug, Clone, Default)]
pub struct NonceSettings {
    /// Static nonce for manual recovery after a stuck transaction.
    pub nonce_override: Option<u64>,
}

impl NonceSettings {
    pub fn to_nonce_config(&self) -> NonceConfig {
        NonceConfig {
            nonce_override: self.nonce_override,
        }
    }
}

/// Registration queue settings.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Announcements buffered by the dispatch lane.
    pub lane_capacity: usize,
    /// Longest a request waits for a free lane slot.
    pub enqueue_timeout_ms: u64,
    /// Mark items completed without touching the chain.
    pub skip_processing: bool,
    /// Never start the background worker.
    pub skip_background_processing: bool,
    /// Longest shutdown waits for the worker to finish its current item.
    pub shutdown_timeout_secs: u64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            lane_capacity: DEFAULT_LANE_CAPACITY,
            enqueue_timeout_ms: 5_000,
            skip_processing: false,
            skip_background_processing: false,
            shutdown_timeout_secs: 30,
        }
    }
}

impl QueueSettings {
    pub fn to_queue_config(&self) -> QueueConfig {
        QueueConfig {
            lane_capacity: self.lane_capacity,
            enqueue_timeout: Duration::from_millis(self.enqueue_timeout_ms),
            skip_processing: self.skip_processing,
            skip_background_processing: self.skip_background_processing,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::load_from(|var| map.get(var).cloned())
    }

    #[test]
    fn test_defaults_fail_validation_without_admin() {
        let config = load(&[]).unwrap();
        assert_eq!(config.queue.lane_capacity, 10);
        assert_eq!(config.nonce.nonce_override, None);
        assert_eq!(config.validate(), Err(ConfigError::ZeroAdminAddress));
    }

    #[test]
    fn test_environment_overrides() {
        let config = load(&[
            ("NS_ADMIN_ADDRESS", "0x61d1eeE7FBF652482DEa98A1Df591C626bA09a60"),
            ("NS_NONCE_OVERRIDE", "0"),
            ("NS_LANE_CAPACITY", "25"),
            ("NS_SKIP_BACKGROUND_PROCESSING", "true"),
            ("NS_IN_MEMORY", "true"),
            ("NS_DATA_DIR", "/var/lib/anyns"),
        ])
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.nonce.nonce_override, Some(0));
        assert_eq!(config.queue.lane_capacity, 25);
        assert!(config.queue.skip_background_processing);
        assert!(config.storage.in_memory);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/anyns"));
        assert_eq!(config.queue.to_queue_config().lane_capacity, 25);
    }

    #[test]
    fn test_invalid_value_names_the_variable() {
        let err = load(&[("NS_LANE_CAPACITY", "ten")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                var: "NS_LANE_CAPACITY",
                ..
            }
        ));

        assert!(load(&[("NS_ADMIN_ADDRESS", "0x12")]).is_err());
    }

    #[test]
    fn test_zero_lane_capacity_rejected() {
        let config = load(&[
            ("NS_ADMIN_ADDRESS", "0x61d1eeE7FBF652482DEa98A1Df591C626bA09a60"),
            ("NS_LANE_CAPACITY", "0"),
        ])
        .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ZeroLaneCapacity));
    }
}
