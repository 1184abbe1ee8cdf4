use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub event_log: String,
    pub first_eligible_season: u32,
    pub cached_season_cutoff: u32,
    pub state_digest_out: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let event_log = env_map
            .get("EVENT_LOG")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("EVENT_LOG".to_string()))?;

        let first_eligible_season = env_map
            .get("FIRST_ELIGIBLE_SEASON")
            .map(|s| s.as_str())
            .unwrap_or("6074")
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "FIRST_ELIGIBLE_SEASON".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?;

        let cached_season_cutoff = env_map
            .get("CACHED_SEASON_CUTOFF")
            .map(|s| s.as_str())
            .unwrap_or("20000")
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "CACHED_SEASON_CUTOFF".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?;

        let state_digest_out = env_map.get("STATE_DIGEST_OUT").cloned();

        Ok(Config {
            event_log,
            first_eligible_season,
            cached_season_cutoff,
            state_digest_out,
        })
    }
}
