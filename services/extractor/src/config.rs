//! Job configuration loading.
//!
//! An extraction job can be described in a YAML file instead of (or in
//! addition to) command-line flags; flags win where both are given.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use geocode_client::NominatimConfig;
use serde::Deserialize;
use tracing::debug;

/// Root configuration loaded from a job YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which dataset to extract.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// OPeNDAP URL of the resource.
    pub url: String,
    /// Name of the variable of interest.
    pub variable: String,
    /// Two-field credentials file (username,password).
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
}

/// Reverse-geocoding provider settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeocoderConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Minimum spacing between provider requests, in seconds.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_min_interval_secs() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    1
}

impl GeocoderConfig {
    /// Materialize client settings, starting from the client defaults.
    pub fn to_client_config(&self) -> NominatimConfig {
        let defaults = NominatimConfig::default();
        NominatimConfig {
            endpoint: self.endpoint.clone().unwrap_or(defaults.endpoint),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout: Duration::from_secs(self.timeout_secs),
            min_interval: Duration::from_secs(self.min_interval_secs),
            max_retries: self.max_retries,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Write the result table to this CSV path.
    #[serde(default)]
    pub csv: Option<PathBuf>,
}

impl JobConfig {
    /// Load a job configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;

        let config: JobConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse job file: {}", path.display()))?;

        debug!(url = %config.dataset.url, variable = %config.dataset.variable, "Loaded job config");
        Ok(config)
    }
}
