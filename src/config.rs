// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::services::feed::DEFAULT_FEED_CAPACITY;
use crate::services::route::JUMP_THRESHOLD_METERS;
use crate::services::TrackerConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// SQLite database file
    pub database_path: String,
    /// Metrics tick period while a workout is active
    pub tick_interval_ms: u64,
    /// Fixes farther than this from the last accepted one are dropped
    pub jump_threshold_m: f64,
    /// Buffered location fixes
    pub feed_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default; a value that is set but unparseable is
    /// an error rather than silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self {
            port: parse_var("PORT", 8080)?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "fittrack.db".to_string()),
            tick_interval_ms: parse_var("TICK_INTERVAL_MS", 1000)?,
            jump_threshold_m: parse_var("JUMP_THRESHOLD_METERS", JUMP_THRESHOLD_METERS)?,
            feed_capacity: parse_var("FEED_CAPACITY", DEFAULT_FEED_CAPACITY)?,
        };

        if config.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "TICK_INTERVAL_MS",
                value: "0".to_string(),
            });
        }
        if !(config.jump_threshold_m.is_finite() && config.jump_threshold_m > 0.0) {
            return Err(ConfigError::Invalid {
                var: "JUMP_THRESHOLD_METERS",
                value: config.jump_threshold_m.to_string(),
            });
        }

        Ok(config)
    }

    /// Config for tests: in-memory database, default tuning.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            database_path: ":memory:".to_string(),
            tick_interval_ms: 1000,
            jump_threshold_m: JUMP_THRESHOLD_METERS,
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            jump_threshold_m: self.jump_threshold_m,
        }
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("PORT", "9090");
        env::set_var("TICK_INTERVAL_MS", "250");
        env::remove_var("JUMP_THRESHOLD_METERS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 9090);
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.jump_threshold_m, 50.0);
        assert_eq!(
            config.tracker_config().tick_interval,
            Duration::from_millis(250)
        );

        env::set_var("FEED_CAPACITY", "lots");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                var: "FEED_CAPACITY",
                ..
            })
        ));
        env::remove_var("FEED_CAPACITY");
    }
}
