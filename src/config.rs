//! Configuration Module
//!
//! Cache construction parameters with defaults and environment loading.

use std::env;

/// Default sweep interval in seconds.
pub const DEFAULT_CHECK_PERIOD: u64 = 30;

/// Cache configuration parameters.
///
/// Immutable once the cache is constructed. All fields have defaults; values
/// can also be loaded from environment variables via [`CacheConfig::from_env`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Default TTL in seconds applied to new entries (0 = never expires)
    pub ttl: u64,
    /// Sweep interval in seconds; 0 disables the sweeper entirely and turns
    /// the cache into a plain map with manual deletion only
    pub check_period: u64,
    /// Hard ceiling on distinct keys (0 = unbounded)
    pub max_keys: usize,
    /// Whether a lapsed entry is auto-deleted when no expired listener is
    /// registered
    pub delete_on_expire: bool,
}

impl CacheConfig {
    /// Creates a CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Default TTL in seconds (default: 60)
    /// - `CACHE_CHECK_PERIOD` - Sweep interval in seconds (default: 30)
    /// - `CACHE_MAX_KEYS` - Key ceiling, 0 = unbounded (default: 0)
    /// - `CACHE_DELETE_ON_EXPIRE` - Auto-delete lapsed entries (default: true)
    pub fn from_env() -> Self {
        Self {
            ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2 * DEFAULT_CHECK_PERIOD),
            check_period: env::var("CACHE_CHECK_PERIOD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CHECK_PERIOD),
            max_keys: env::var("CACHE_MAX_KEYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            delete_on_expire: env::var("CACHE_DELETE_ON_EXPIRE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Sets the default TTL in seconds.
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the sweep interval in seconds. Zero disables the sweeper.
    pub fn with_check_period(mut self, secs: u64) -> Self {
        self.check_period = secs;
        self
    }

    /// Sets the hard ceiling on distinct keys. Zero means unbounded.
    pub fn with_max_keys(mut self, max: usize) -> Self {
        self.max_keys = max;
        self
    }

    /// Sets whether lapsed entries are auto-deleted when nothing listens for
    /// expirations.
    pub fn with_delete_on_expire(mut self, delete: bool) -> Self {
        self.delete_on_expire = delete;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: 2 * DEFAULT_CHECK_PERIOD,
            check_period: DEFAULT_CHECK_PERIOD,
            max_keys: 0,
            delete_on_expire: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, 60);
        assert_eq!(config.check_period, 30);
        assert_eq!(config.max_keys, 0);
        assert!(config.delete_on_expire);
    }

    #[test]
    fn test_config_builders() {
        let config = CacheConfig::default()
            .with_ttl(10)
            .with_check_period(5)
            .with_max_keys(100)
            .with_delete_on_expire(false);

        assert_eq!(config.ttl, 10);
        assert_eq!(config.check_period, 5);
        assert_eq!(config.max_keys, 100);
        assert!(!config.delete_on_expire);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_TTL");
        env::remove_var("CACHE_CHECK_PERIOD");
        env::remove_var("CACHE_MAX_KEYS");
        env::remove_var("CACHE_DELETE_ON_EXPIRE");

        let config = CacheConfig::from_env();
        assert_eq!(config.ttl, 60);
        assert_eq!(config.check_period, 30);
        assert_eq!(config.max_keys, 0);
        assert!(config.delete_on_expire);
    }
}
