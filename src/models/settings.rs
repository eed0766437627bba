//! Run-level gameplay configuration.
//!
//! Loaded once, passed to the ruleset at construction, never read from
//! ambient state mid-simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// When watching a replay, swallow fail events instead of ending the run.
    pub ignore_fails_in_replays: bool,
    /// Log a trace line after every judgement (single-cursor runs only).
    pub log_every_hit: bool,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            ignore_fails_in_replays: false,
            log_every_hit: true,
        }
    }
}

/// Error loading a gameplay config.
#[derive(Debug)]
pub enum ConfigError {
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Invalid gameplay config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameplayConfig {
    /// Parses a config from TOML; missing keys take defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg = GameplayConfig::from_toml("ignore_fails_in_replays = true").unwrap();
        assert!(cfg.ignore_fails_in_replays);
        assert!(cfg.log_every_hit);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(GameplayConfig::from_toml("ignore_fails_in_replays = 3").is_err());
    }
}
