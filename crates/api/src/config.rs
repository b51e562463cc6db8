//! Application configuration loaded from environment variables.

use std::time::Duration;

use dist_lock::MutexConfig;
use saga::{CartClearPolicy, SagaConfig};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — Postgres connection string; in-memory stores are
///   used when unset
/// - `LOCK_LEASE_SECS` — goods lock lease duration (default: `10`)
/// - `LOCK_MAX_RETRIES` — lock acquisition attempts (default: `3`)
/// - `LOCK_RETRY_DELAY_MS` — delay between attempts (default: `100`)
/// - `CART_CLEAR_POLICY` — `"rollback"` or `"keep"` (default:
///   `"rollback"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub lock_lease: Duration,
    pub lock_max_retries: u32,
    pub lock_retry_delay: Duration,
    pub cart_clear_policy: CartClearPolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL").ok(),
            lock_lease: parse_env("LOCK_LEASE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.lock_lease),
            lock_max_retries: parse_env("LOCK_MAX_RETRIES").unwrap_or(defaults.lock_max_retries),
            lock_retry_delay: parse_env("LOCK_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.lock_retry_delay),
            cart_clear_policy: match std::env::var("CART_CLEAR_POLICY").as_deref() {
                Ok("keep") => CartClearPolicy::KeepOrder,
                _ => CartClearPolicy::RollbackOrder,
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the lock tuning as a mutex config.
    pub fn mutex_config(&self) -> MutexConfig {
        MutexConfig {
            lease_duration: self.lock_lease,
            max_retries: self.lock_max_retries,
            retry_delay: self.lock_retry_delay,
        }
    }

    /// Returns the saga tuning.
    pub fn saga_config(&self) -> SagaConfig {
        SagaConfig {
            cart_clear_failure: self.cart_clear_policy,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            lock_lease: Duration::from_secs(10),
            lock_max_retries: 3,
            lock_retry_delay: Duration::from_millis(100),
            cart_clear_policy: CartClearPolicy::RollbackOrder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.lock_lease, Duration::from_secs(10));
        assert_eq!(config.lock_max_retries, 3);
        assert_eq!(config.lock_retry_delay, Duration::from_millis(100));
        assert_eq!(config.cart_clear_policy, CartClearPolicy::RollbackOrder);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_mutex_config_mirrors_lock_settings() {
        let config = Config::default();
        let mutex = config.mutex_config();
        assert_eq!(mutex.lease_duration, config.lock_lease);
        assert_eq!(mutex.max_retries, config.lock_max_retries);
        assert_eq!(mutex.retry_delay, config.lock_retry_delay);
    }
}
