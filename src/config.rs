//! Runtime configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of lock shards in the memory storage
    pub shards: usize,

    /// Initial capacity of each shard
    pub initial_capacity: usize,

    /// Period of the background expiry sweep in milliseconds (0 = disabled)
    pub sweep_interval_ms: u64,

    /// Default tracing filter, overridden by RUST_LOG
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            // One shard per CPU core, min 1, max 16
            shards: num_cpus::get().clamp(1, 16),
            initial_capacity: 1024,
            sweep_interval_ms: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from a JSON document
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(json).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.shards == 0 {
            bail!("shards must be greater than 0");
        }
        Ok(())
    }

    /// Sweep period, None when the sweeper is disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self.sweep_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
