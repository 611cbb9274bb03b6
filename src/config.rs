use std::time::Duration;
use thiserror::Error;

use crate::presence::ReaperConfig;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

/// Process settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// PostgreSQL connection string; in-memory stores are used when absent
    pub database_url: Option<String>,
    pub reaper: ReaperConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            reaper: ReaperConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => u16::try_from(parse_positive("PORT", &value)?).map_err(|_| {
                ConfigError::InvalidNumber {
                    name: "PORT",
                    value,
                }
            })?,
            None => defaults.port,
        };

        let sweep_interval = match lookup("REAPER_INTERVAL_SECS") {
            Some(value) => Duration::from_secs(parse_positive("REAPER_INTERVAL_SECS", &value)?),
            None => defaults.reaper.sweep_interval,
        };

        let inactivity_threshold = match lookup("INACTIVITY_THRESHOLD_SECS") {
            Some(value) => {
                Duration::from_secs(parse_positive("INACTIVITY_THRESHOLD_SECS", &value)?)
            }
            None => defaults.reaper.inactivity_threshold,
        };

        Ok(Self {
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            reaper: ReaperConfig {
                sweep_interval,
                inactivity_threshold,
            },
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|parsed| *parsed > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}
