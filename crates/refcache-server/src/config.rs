//! Server configuration

use refcache_core::CacheConfig;
use std::net::SocketAddr;

/// Server configuration, assembled from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub addr: SocketAddr,
    /// Cache service configuration
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8270".parse().unwrap(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Recognized variables:
    /// - `REFCACHE_ADDR` - bind address (default `127.0.0.1:8270`)
    /// - `REFCACHE_API_KEY` - remote table source credential (required)
    /// - `REFCACHE_ENDPOINT` - remote table source endpoint
    /// - `REFCACHE_CACHE_DIR` - snapshot directory
    /// - `REFCACHE_MAX_AGE_HOURS` - staleness threshold
    /// - `REFCACHE_REFRESH_ENABLED` - enable the daily refresh scheduler
    /// - `REFCACHE_REFRESH_SCHEDULE` - `HH:MM` trigger (default `02:00`)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("REFCACHE_ADDR") {
            match addr.parse() {
                Ok(addr) => config.addr = addr,
                Err(err) => {
                    tracing::warn!(%err, addr, "invalid REFCACHE_ADDR, using default")
                }
            }
        }

        if let Ok(api_key) = std::env::var("REFCACHE_API_KEY") {
            config.cache.api_key = api_key;
        }
        if let Ok(endpoint) = std::env::var("REFCACHE_ENDPOINT") {
            config.cache.endpoint = endpoint;
        }
        if let Ok(dir) = std::env::var("REFCACHE_CACHE_DIR") {
            config.cache.cache_dir = dir.into();
        }
        if let Ok(hours) = std::env::var("REFCACHE_MAX_AGE_HOURS") {
            match hours.parse() {
                Ok(hours) => config.cache.max_age_hours = hours,
                Err(err) => {
                    tracing::warn!(%err, hours, "invalid REFCACHE_MAX_AGE_HOURS, using default")
                }
            }
        }

        if let Ok(enabled) = std::env::var("REFCACHE_REFRESH_ENABLED") {
            config.cache.refresh.enabled = matches!(enabled.as_str(), "1" | "true" | "yes");
        }
        if let Ok(schedule) = std::env::var("REFCACHE_REFRESH_SCHEDULE") {
            config.cache.refresh.schedule = schedule;
        }

        config
    }
}
