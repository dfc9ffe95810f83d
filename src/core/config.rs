//! Engine, weather and storage configuration with documented constants
//!
//! All thresholds that shape catch pacing live here, with explanations of
//! how they interact. Values load from a TOML file; anything left out of the
//! file keeps its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{CharmError, Result};

/// Pacing of step accumulation, catch checks and inactivity detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === CATCH CADENCE ===
    /// Accumulated steps required before a catch cycle may run
    ///
    /// Below this nothing in the catalog is worth evaluating, and skipping
    /// the cycle also skips any weather lookup.
    pub check_threshold_steps: u32,

    /// Minimum time between two catch cycles (milliseconds)
    ///
    /// At 3 minutes and a 60 minute weather TTL, a continuous walk causes at
    /// most one weather fetch per hour.
    pub check_cooldown_ms: i64,

    // === INACTIVITY ===
    /// Length of the sliding step-history window (milliseconds)
    pub window_ms: i64,

    /// Steps the window must hold for the walker to count as active
    ///
    /// At 20 steps per 10 minutes, standing around or pocket jitter resets
    /// the walk; a slow stroll does not.
    pub min_steps_in_window: u32,

    /// Accumulated steps that make a walk worth an "inactive" message
    ///
    /// Must not exceed `check_threshold_steps`, otherwise a walker could be
    /// checked for creatures but never told they stopped.
    pub walk_threshold_steps: u32,

    /// Hard cap on retained step-history entries
    pub max_history_entries: usize,

    // === MESSAGES ===
    /// Minimum time an encouragement message stays up (milliseconds)
    ///
    /// Back-to-back misses within one cycle would otherwise flicker through
    /// several messages in the same second.
    pub encouragement_hold_ms: i64,

    // === DISTANCE ===
    /// Metres per step, used when a sample carries no measured distance
    pub stride_m: f64,

    // === FIRST RUN ===
    /// Creature granted (caught and queued as new) on first run
    pub starter_creature: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_threshold_steps: 400,
            check_cooldown_ms: 3 * 60 * 1000,
            window_ms: 10 * 60 * 1000,
            min_steps_in_window: 20,
            walk_threshold_steps: 250,
            max_history_entries: 2048,
            encouragement_hold_ms: 60 * 1000,
            stride_m: 0.75,
            starter_creature: Some(0),
        }
    }
}

/// Weather lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// `current.json` endpoint of the weather service
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub latitude: f64,
    pub longitude: f64,
    /// How long a fetched snapshot stays fresh (milliseconds)
    pub cache_ttl_ms: i64,
    /// Connect and read timeout for the HTTP call (seconds)
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.weatherapi.com/v1/current.json".into(),
            api_key_env: "WEATHER_API_KEY".into(),
            latitude: 50.4501,
            longitude: 30.5234,
            cache_ttl_ms: 60 * 60 * 1000,
            timeout_secs: 30,
        }
    }
}

/// Where progress state is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("charmings_progress.json"),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub weather: WeatherConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse_toml(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        if engine.window_ms <= 0 {
            return Err(CharmError::Config("window_ms must be positive".into()));
        }
        if engine.check_cooldown_ms < 0 || engine.encouragement_hold_ms < 0 {
            return Err(CharmError::Config(
                "check_cooldown_ms and encouragement_hold_ms must not be negative".into(),
            ));
        }
        if engine.walk_threshold_steps > engine.check_threshold_steps {
            return Err(CharmError::Config(format!(
                "walk_threshold_steps ({}) should be <= check_threshold_steps ({})",
                engine.walk_threshold_steps, engine.check_threshold_steps
            )));
        }
        if engine.max_history_entries == 0 {
            return Err(CharmError::Config("max_history_entries must be positive".into()));
        }
        if !(engine.stride_m > 0.0) {
            return Err(CharmError::Config("stride_m must be positive".into()));
        }

        let weather = &self.weather;
        if weather.cache_ttl_ms <= 0 {
            return Err(CharmError::Config("cache_ttl_ms must be positive".into()));
        }
        if !(-90.0..=90.0).contains(&weather.latitude)
            || !(-180.0..=180.0).contains(&weather.longitude)
        {
            return Err(CharmError::Config(format!(
                "location ({}, {}) is out of range",
                weather.latitude, weather.longitude
            )));
        }

        Ok(())
    }
}
