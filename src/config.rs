//! Configuration Module
//!
//! Handles loading gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::retry::RetryConfig;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the Gemini endpoint
    pub api_key: String,
    /// Model name used in the generateContent URL
    pub model: String,
    /// Base URL of the Gemini REST API
    pub base_url: String,
    /// Minimum gap between the starts of consecutive upstream calls
    pub rate_limit_gap: Duration,
    /// Maximum number of entries the response cache can hold
    pub cache_max_entries: usize,
    /// Default TTL for cached responses
    pub cache_default_ttl: Duration,
    /// Retry policy applied to each upstream call
    pub retry: RetryConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GEMINI_API_KEY` / `GEMINI_API` - API key (default: empty)
    /// - `GEMINI_MODEL` - Model name (default: gemini-1.5-flash)
    /// - `GEMINI_BASE_URL` - API base URL
    /// - `RATE_LIMIT_GAP_MS` - Minimum inter-request gap (default: 4000)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `RETRY_MAX` - Retries after the first attempt (default: 3)
    /// - `RETRY_INITIAL_DELAY_MS` - First backoff delay (default: 2000)
    /// - `RETRY_MAX_DELAY_MS` - Backoff ceiling (default: 10000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: env::var("GEMINI_API_KEY")
                .or_else(|_| env::var("GEMINI_API"))
                .unwrap_or(defaults.api_key),
            model: env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            rate_limit_gap: env_parse::<u64>("RATE_LIMIT_GAP_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit_gap),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            cache_default_ttl: env_parse::<u64>("CACHE_DEFAULT_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_default_ttl),
            retry: RetryConfig {
                max_retries: env_parse("RETRY_MAX").unwrap_or(defaults.retry.max_retries),
                initial_delay: env_parse::<u64>("RETRY_INITIAL_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.initial_delay),
                max_delay: env_parse::<u64>("RETRY_MAX_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.max_delay),
            },
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: env_parse("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            // 15 requests per minute
            rate_limit_gap: Duration::from_millis(4000),
            cache_max_entries: 100,
            cache_default_ttl: Duration::from_secs(300),
            retry: RetryConfig::default(),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.rate_limit_gap, Duration::from_secs(4));
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.cache_default_ttl, Duration::from_secs(300));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("RATE_LIMIT_GAP_MS");
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("RETRY_MAX");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.rate_limit_gap, Duration::from_millis(4000));
        assert_eq!(config.cache_max_entries, 100);
        assert_eq!(config.cache_default_ttl, Duration::from_secs(300));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.server_port, 3000);
    }
}
