use std::env;
use std::path::Path;

use serde::Deserialize;

pub const ENV_START_INDEX: &str = "FLIGHT_START_INDEX";
pub const ENV_JUMP_THRESHOLD: &str = "FLIGHT_JUMP_THRESHOLD";
pub const ENV_MULTIPLIER: &str = "FLIGHT_MULTIPLIER";

/// Playback tuning.
///
/// Defaults match the flight logs this viewer was built for: the first 28
/// samples are device warm-up, longitude spikes above 0.01 degrees are
/// telemetry noise, and playback runs at 5x.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackConfig {
    pub start_index: usize,
    pub jump_threshold: f64,
    pub multiplier: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            start_index: 28,
            jump_threshold: 0.01,
            multiplier: 5.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidEnv { name: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config read failed: {e}"),
            ConfigError::Json(e) => write!(f, "config parse failed: {e}"),
            ConfigError::InvalidEnv { name, value } => {
                write!(f, "invalid value for {name}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl PlaybackConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError::Json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let payload = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&payload)
    }

    /// Applies `FLIGHT_*` environment overrides on top of `self`.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Applies overrides from `lookup`; split out from `with_env` for tests.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_START_INDEX) {
            self.start_index = parse_env(ENV_START_INDEX, &v)?;
        }
        if let Some(v) = lookup(ENV_JUMP_THRESHOLD) {
            self.jump_threshold = parse_env(ENV_JUMP_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(ENV_MULTIPLIER) {
            self.multiplier = parse_env(ENV_MULTIPLIER, &v)?;
        }
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        value: value.to_string(),
    })
}
