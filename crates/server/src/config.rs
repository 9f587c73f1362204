//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres store only)
//! - `BAATTAK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `BAATTAK_STORE` - `postgres` (default) or `memory`
//! - `BAATTAK_HOST` - Bind address (default: 127.0.0.1)
//! - `BAATTAK_PORT` - Listen port (default: 3001)
//! - `CART_SWEEP_INTERVAL_SECS` - Seconds between expiry sweeps (default: 60)
//! - `CART_STALE_AFTER_SECS` - Cart age before it is migrated (default: 300)
//! - `REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `CORS_ALLOWED_ORIGINS` - Comma separated list of front-end origins
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::SweepConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which record store backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Durable `PostgreSQL` store.
    #[default]
    Postgres,
    /// Process-local store; everything is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store '{other}', expected postgres or memory")),
        }
    }
}

/// Sentry settings.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; Sentry is disabled when absent.
    pub dsn: Option<String>,
    /// Environment name reported with events.
    pub environment: Option<String>,
    /// Fraction of error events sent.
    pub sample_rate: f32,
    /// Fraction of transactions sent.
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Record store backend
    pub store: StoreBackend,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Expiry sweeper timing
    pub sweep: SweepConfig,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Origins allowed by CORS; empty means same-origin only
    pub cors_allowed_origins: Vec<String>,
    /// Emit JSON logs
    pub json_logs: bool,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = parse_env("BAATTAK_STORE", StoreBackend::default())?;
        let database_url = match store {
            StoreBackend::Postgres => Some(get_database_url("BAATTAK_DATABASE_URL")?),
            StoreBackend::Memory => None,
        };
        let host = parse_env("BAATTAK_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env("BAATTAK_PORT", 3001_u16)?;

        let sweep = SweepConfig {
            period: get_secs("CART_SWEEP_INTERVAL_SECS", 60)?,
            stale_after: Duration::from_secs(parse_env("CART_STALE_AFTER_SECS", 300_u64)?),
        };
        let request_timeout = get_secs("REQUEST_TIMEOUT_SECS", 30)?;

        let cors_allowed_origins = get_optional_env("CORS_ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        let sentry = SentryConfig {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        };

        Ok(Self {
            store,
            database_url,
            host,
            port,
            sweep,
            request_timeout,
            cors_allowed_origins,
            json_logs,
            sentry,
        })
    }

    /// Configuration for an in-memory server, used by tests and local runs.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: StoreBackend::Memory,
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            sweep: SweepConfig::default(),
            request_timeout: Duration::from_secs(30),
            cors_allowed_origins: Vec::new(),
            json_logs: false,
            sentry: SentryConfig::default(),
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// A strictly positive number of seconds.
fn get_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    let secs = parse_env(key, default)?;
    positive_secs(key, secs)
}

fn positive_secs(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let rate = parse_env(key, default)?;
    check_sample_rate(key, rate)
}

fn check_sample_rate(key: &str, rate: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

/// Split a comma separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_from_str() {
        assert_eq!("postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" Memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("BAATTAK_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BAATTAK_PORT"));
        assert_eq!(parse_value::<u16>("BAATTAK_PORT", " 8080 ").unwrap(), 8080);
    }

    #[test]
    fn test_zero_seconds_rejected() {
        assert!(positive_secs("CART_SWEEP_INTERVAL_SECS", 0).is_err());
        assert_eq!(
            positive_secs("CART_SWEEP_INTERVAL_SECS", 60).unwrap(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_sample_rate_bounds() {
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", 0.5).is_ok());
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", 1.5).is_err());
        assert!(check_sample_rate("SENTRY_SAMPLE_RATE", -0.1).is_err());
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("http://localhost:3000/, https://baattak.app,,  ");
        assert_eq!(origins, vec!["http://localhost:3000", "https://baattak.app"]);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::in_memory();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_in_memory_uses_default_sweep() {
        let config = ServerConfig::in_memory();
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.sweep, SweepConfig::default());
    }
}
