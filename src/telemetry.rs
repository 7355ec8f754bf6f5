//! Logging setup

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// RUST_LOG wins over `config.log_filter` when set. Fails if a subscriber
/// is already installed.
pub fn init(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}
