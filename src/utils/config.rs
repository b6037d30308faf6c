use crate::report::ReportConfig;
use crate::signals::SignalParams;
use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub signal: SignalParams,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding one `<code>.json` record file per listing
    pub data_dir: String,
    /// JSON array of `{ code, name }` listings
    pub listings_file: String,
    /// Months of history requested from the record source
    pub lookback_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub output: String,
    pub file_path: String,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.signal.validate()?;
        Ok(config)
    }

    /// Load from environment variable or default path
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_FILE")
            .unwrap_or_else(|_| "config/default.toml".to_string());
        Self::from_file(path)
    }
}
