//! Recovery configuration.
//!
//! A single JSON document describes the trade source and every market to
//! recover. Per-market entries may override the source-wide defaults.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BUDA_BASE_URL, DEFAULT_MARKETS, DEFAULT_PAGE_SIZE, DEFAULT_POLL_INTERVAL_SEC,
    DEFAULT_SLEEP_TIME_AFTER_BLOCK, DEFAULT_SLEEP_TIME_SEC,
};
use crate::errors::{Error, Result};

/// Supported trade sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Buda,
}

/// One market to recover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Local identifier, used as the state and storage key
    pub id: String,

    /// Identifier the source knows the market by, defaults to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time_sec: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time_after_block: Option<u64>,
}

impl MarketConfig {
    pub fn new(id: impl Into<String>, remote_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            remote_id: Some(remote_id.into()),
            base_url: None,
            page_size: None,
            sleep_time_sec: None,
            sleep_time_after_block: None,
        }
    }
}

/// Source-wide settings plus the list of markets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub source: SourceKind,
    pub base_url: String,
    pub page_size: u32,
    pub sleep_time_sec: u64,
    pub sleep_time_after_block: u64,
    pub poll_interval_sec: u64,
    pub markets: Vec<MarketConfig>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Buda,
            base_url: DEFAULT_BUDA_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sleep_time_sec: DEFAULT_SLEEP_TIME_SEC,
            sleep_time_after_block: DEFAULT_SLEEP_TIME_AFTER_BLOCK,
            poll_interval_sec: DEFAULT_POLL_INTERVAL_SEC,
            markets: DEFAULT_MARKETS
                .iter()
                .map(|(id, remote)| MarketConfig::new(*id, *remote))
                .collect(),
        }
    }
}

/// Fully resolved settings for one market.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    pub market_id: String,
    pub remote_id: String,
    pub source: SourceKind,
    pub base_url: String,
    pub page_size: u32,
    pub request_delay: Duration,
    pub blocked_backoff: Duration,
    pub poll_interval: Duration,
}

impl RecoveryConfig {
    /// Loads and validates the configuration at `path`.
    ///
    /// A missing file yields the built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "No configuration at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        let config: RecoveryConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigIO(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        debug!(
            "Loaded configuration from {} with {} markets",
            path.display(),
            config.markets.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.markets.is_empty() {
            return Err(Error::InvalidConfigValue(
                "at least one market is required".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(Error::InvalidConfigValue(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfigValue(
                "base_url must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for market in &self.markets {
            if market.id.trim().is_empty() {
                return Err(Error::InvalidConfigValue(
                    "market id must not be empty".to_string(),
                ));
            }
            if !seen.insert(market.id.as_str()) {
                return Err(Error::InvalidConfigValue(format!(
                    "duplicate market id '{}'",
                    market.id
                )));
            }
            if market.page_size == Some(0) {
                return Err(Error::InvalidConfigValue(format!(
                    "page_size for '{}' must be greater than zero",
                    market.id
                )));
            }
            if matches!(&market.base_url, Some(url) if url.trim().is_empty()) {
                return Err(Error::InvalidConfigValue(format!(
                    "base_url for '{}' must not be empty",
                    market.id
                )));
            }
        }
        Ok(())
    }

    /// Keeps only the markets named in `ids`, in configuration order.
    pub fn retain_markets(&mut self, ids: &[String]) -> Result<()> {
        if let Some(unknown) = ids
            .iter()
            .find(|id| !self.markets.iter().any(|m| &m.id == *id))
        {
            return Err(Error::InvalidConfigValue(format!(
                "unknown market '{}'",
                unknown
            )));
        }
        self.markets.retain(|m| ids.contains(&m.id));
        Ok(())
    }

    pub fn market_settings(&self, market_id: &str) -> Result<MarketSettings> {
        self.markets
            .iter()
            .find(|m| m.id == market_id)
            .map(|m| self.resolve(m))
            .ok_or_else(|| Error::InvalidConfigValue(format!("unknown market '{}'", market_id)))
    }

    pub fn all_market_settings(&self) -> Vec<MarketSettings> {
        self.markets.iter().map(|m| self.resolve(m)).collect()
    }

    fn resolve(&self, market: &MarketConfig) -> MarketSettings {
        MarketSettings {
            market_id: market.id.clone(),
            remote_id: market.remote_id.clone().unwrap_or_else(|| market.id.clone()),
            source: self.source,
            base_url: market
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            page_size: market.page_size.unwrap_or(self.page_size),
            request_delay: Duration::from_secs(
                market.sleep_time_sec.unwrap_or(self.sleep_time_sec),
            ),
            blocked_backoff: Duration::from_secs(
                market
                    .sleep_time_after_block
                    .unwrap_or(self.sleep_time_after_block),
            ),
            poll_interval: Duration::from_secs(self.poll_interval_sec),
        }
    }
}
