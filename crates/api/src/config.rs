//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use orchestrator::{CircuitBreakerConfig, RetryPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` / `PORT`: bind address (default: `"0.0.0.0"` / `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `USERS_MICROSERVICE_NAME` / `USERS_MICROSERVICE_PORT`: identity service (default: `localhost:9090`)
/// - `PRODUCTS_MICROSERVICE_NAME` / `PRODUCTS_MICROSERVICE_PORT`: catalog service (default: `localhost:8080`)
/// - `DOWNSTREAM_TIMEOUT_MS`: per-request timeout for both services (default: `10000`)
/// - `USERS_RETRY_COUNT` / `USERS_RETRY_BASE_DELAY_MS`: identity retries (default: `3` / `2000`)
/// - `USERS_BREAKER_FAILURE_THRESHOLD` / `USERS_BREAKER_BREAK_SECS`: identity breaker (default: `4` / `120`)
/// - `DATABASE_URL`: Postgres connection string; orders are kept in memory when unset
/// - `CORS_ALLOWED_ORIGIN`: allowed browser origin (default: `"http://localhost:4200"`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub users_service_url: String,
    pub products_service_url: String,
    pub downstream_timeout: Duration,
    pub users_retry: RetryPolicy,
    pub users_breaker: CircuitBreakerConfig,
    pub database_url: Option<String>,
    pub cors_allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let users_host = string("USERS_MICROSERVICE_NAME", "localhost".to_string());
        let users_port = string("USERS_MICROSERVICE_PORT", "9090".to_string());
        let products_host = string("PRODUCTS_MICROSERVICE_NAME", "localhost".to_string());
        let products_port = string("PRODUCTS_MICROSERVICE_PORT", "8080".to_string());

        Self {
            host: string("HOST", defaults.host),
            port: parse_or(lookup("PORT"), defaults.port),
            log_level: string("RUST_LOG", defaults.log_level),
            users_service_url: format!("http://{users_host}:{users_port}"),
            products_service_url: format!("http://{products_host}:{products_port}"),
            downstream_timeout: parsed("DOWNSTREAM_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.downstream_timeout),
            users_retry: RetryPolicy {
                max_retries: parse_or(lookup("USERS_RETRY_COUNT"), defaults.users_retry.max_retries),
                base_delay: parsed("USERS_RETRY_BASE_DELAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.users_retry.base_delay),
            },
            users_breaker: CircuitBreakerConfig {
                failure_threshold: parse_or(
                    lookup("USERS_BREAKER_FAILURE_THRESHOLD"),
                    defaults.users_breaker.failure_threshold,
                ),
                break_duration: parsed("USERS_BREAKER_BREAK_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.users_breaker.break_duration),
            },
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            cors_allowed_origin: string("CORS_ALLOWED_ORIGIN", defaults.cors_allowed_origin),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            users_service_url: "http://localhost:9090".to_string(),
            products_service_url: "http://localhost:8080".to_string(),
            downstream_timeout: Duration::from_millis(10_000),
            users_retry: RetryPolicy::default(),
            users_breaker: CircuitBreakerConfig::default(),
            database_url: None,
            cors_allowed_origin: "http://localhost:4200".to_string(),
        }
    }
}
