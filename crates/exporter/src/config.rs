//! Exporter configuration

use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Exporter configuration, read from `EXPORTER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// Port for `/metrics`, `/healthz` and `/readyz`
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Constant labels as `key=value` pairs separated by commas
    #[serde(default)]
    pub const_labels: String,
}

fn default_listen_port() -> u16 {
    8080
}

impl ExporterConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_env(config::Environment::with_prefix("EXPORTER"))
    }

    fn from_env(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder().add_source(env).build()?;
        let loaded: Self = config.try_deserialize()?;

        // Reject malformed labels at startup rather than on first scrape
        loaded.const_labels()?;
        Ok(loaded)
    }

    /// Constant labels attached to every exported descriptor
    pub fn const_labels(&self) -> Result<HashMap<String, String>> {
        parse_const_labels(&self.const_labels)
    }
}

/// Parse `key=value,key2=value2`; blank input yields no labels
pub fn parse_const_labels(raw: &str) -> Result<HashMap<String, String>> {
    let mut labels = HashMap::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("constant label {:?} is not of the form key=value", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("constant label {:?} has an empty name", pair);
        }
        if labels
            .insert(key.to_string(), value.trim().to_string())
            .is_some()
        {
            bail!("constant label {:?} is set more than once", key);
        }
    }

    Ok(labels)
}
