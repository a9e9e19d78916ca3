use crate::error::{HarvestError, Result};
use serde::Deserialize;
use std::fs;

/// Runtime configuration loaded from `config.toml`. The city list replaces
/// the ambient settings-module lookup of the old ingestion scripts: callers
/// receive this struct explicitly instead of reading process state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    pub cities: Vec<CityConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Radius of the location-bias circle around each city center.
    pub radius_meters: u32,
    /// Delay between upstream queries, to stay under API rate limits.
    pub delay_ms: u64,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

/// A target city with its canonical name and search-bias coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct CityConfig {
    pub key: String,
    pub canonical_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HarvestError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)?;
        if config.cities.is_empty() {
            return Err(HarvestError::Config("no target cities configured".to_string()));
        }
        Ok(config)
    }

    /// Look up a configured city by key or canonical name, case-insensitively.
    pub fn city(&self, name: &str) -> Option<&CityConfig> {
        let needle = name.trim().to_lowercase();
        self.cities
            .iter()
            .find(|c| c.key == needle || c.canonical_name.to_lowercase() == needle)
    }
}
