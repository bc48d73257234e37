//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::COMPONENT;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache name reported in stats
    pub name: String,
    /// Default TTL in seconds applied by `set`
    pub key_timeout: u64,
    /// Interval in seconds between full-table flushes
    pub flush_cycle: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAME` - Name reported in stats (default: "cachedmap")
    /// - `KEY_TIMEOUT` - Default key TTL in seconds (default: 300)
    /// - `FLUSH_CYCLE` - Flush interval in seconds (default: 900)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env::var("CACHE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.name),
            key_timeout: parse_var("KEY_TIMEOUT").unwrap_or(defaults.key_timeout),
            flush_cycle: parse_var("FLUSH_CYCLE").unwrap_or(defaults.flush_cycle),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Default key TTL as a duration.
    pub fn key_timeout(&self) -> Duration {
        Duration::from_secs(self.key_timeout)
    }

    /// Flush interval as a duration.
    pub fn flush_cycle(&self) -> Duration {
        Duration::from_secs(self.flush_cycle)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: COMPONENT.to_string(),
            key_timeout: 300,
            flush_cycle: 900,
            server_port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.name, "cachedmap");
        assert_eq!(config.key_timeout, 300);
        assert_eq!(config.flush_cycle, 900);
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_config_durations() {
        let config = Config {
            key_timeout: 5,
            flush_cycle: 15,
            ..Config::default()
        };
        assert_eq!(config.key_timeout(), Duration::from_secs(5));
        assert_eq!(config.flush_cycle(), Duration::from_secs(15));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_NAME");
        env::remove_var("KEY_TIMEOUT");
        env::remove_var("FLUSH_CYCLE");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.name, "cachedmap");
        assert_eq!(config.key_timeout, 300);
        assert_eq!(config.flush_cycle, 900);
        assert_eq!(config.server_port, 3000);
    }
}
