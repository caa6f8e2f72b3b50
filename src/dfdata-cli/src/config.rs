//! Configuration for the dfdata batch jobs

use anyhow::{Context, Result};
use dfdata::images::FetchOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DATA_FILE: &str = "data.json";
pub const PROPS_FILE: &str = "price.json";
pub const PRICE_SOURCES: [&str; 3] = ["配件.json", "武器.json", "装备.json"];
pub const OUTPUT_DIR: &str = "normalized_data";
pub const IMAGES_DIR: &str = "normalized_data/images";
pub const WORKERS: usize = 10;
pub const RETRIES: u32 = 3;
pub const TIMEOUT_SECS: u64 = 30;
pub const RETRY_DELAY_MS: u64 = 1000;

/// Paths and fetch settings. Every field falls back to its default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monolithic item export
    pub input: PathBuf,
    /// Prop export (collectibles and consumables)
    pub props_input: PathBuf,
    /// Secondary price exports, later ones override earlier ones
    pub price_sources: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub images_dir: PathBuf,
    pub workers: usize,
    pub retries: u32,
    pub timeout_secs: u64,
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DATA_FILE),
            props_input: PathBuf::from(PROPS_FILE),
            price_sources: PRICE_SOURCES.iter().map(PathBuf::from).collect(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            images_dir: PathBuf::from(IMAGES_DIR),
            workers: WORKERS,
            retries: RETRIES,
            timeout_secs: TIMEOUT_SECS,
            retry_delay_ms: RETRY_DELAY_MS,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dfdata");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.output_dir.join(dfdata::documents::CATALOG_FILE)
    }

    pub fn slot_system_path(&self) -> PathBuf {
        self.output_dir.join(dfdata::documents::SLOT_SYSTEM_FILE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            workers: self.workers,
            retries: self.retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.workers, 10);
        assert_eq!(config.price_sources.len(), 3);
        assert_eq!(config.catalog_path(), PathBuf::from("normalized_data/items_catalog.json"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "workers = 4\noutput_dir = \"out\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.retries, 3);
        assert_eq!(config.fetch_options().retry_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "workers = \"many\"").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let back: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
