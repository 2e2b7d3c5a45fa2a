//! # AnyNS Registrar Node
//!
//! Registers and renews names on behalf of users through a persistent,
//! restart-safe queue.
//!
//! ## Subsystems
//!
//! 1. Nonce Sequencer (ns-01) - Next nonce for the admin account
//! 2. Registration Queue (ns-02) - Commit-reveal registration driver
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `NS_*` environment variables
//! 2. Validate the configuration
//! 3. Initialize subsystems in dependency order
//! 4. Resume interrupted items and start the worker
//! 5. Run until Ctrl+C, then shut down gracefully
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = NodeConfig::load_from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let runtime = NodeRuntime::new(config)?;
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await
}
