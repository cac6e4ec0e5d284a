//! TOML configuration for the `skein` CLI.
//!
//! Every section is optional. A missing config path means all defaults.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use skein_balancer::BalancerConfig;
use skein_types::{DEFAULT_BUCKET_COUNT, StoreId};

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Balancer shape and startup membership.
    pub balancer: BalancerSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[balancer]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BalancerSection {
    /// Buckets per store.
    pub bucket_count: usize,
    /// Stores registered before the script runs.
    pub initial_stores: Vec<StoreId>,
}

impl Default for BalancerSection {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            initial_stores: Vec::new(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Library-level balancer config derived from the `[balancer]` section.
    pub fn balancer_config(&self) -> BalancerConfig {
        BalancerConfig {
            bucket_count: self.balancer.bucket_count,
        }
    }
}
