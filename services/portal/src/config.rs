//! services/portal/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Base URL of the sibling doctor service, e.g. `http://localhost:5001`.
    pub doctor_service_url: String,
    /// Timeout applied to every call to the doctor service.
    pub remote_timeout: Duration,
    /// Lifetime of a browser session cookie, in days.
    pub session_ttl_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Doctor Service Settings ---
        let doctor_service_url = std::env::var("DOCTOR_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:5001".to_string());
        // Trailing slash would double up when joining paths.
        let doctor_service_url = doctor_service_url.trim_end_matches('/').to_string();

        let remote_timeout_secs = match std::env::var("REMOTE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "REMOTE_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a number of seconds", raw),
                )
            })?,
            Err(_) => 10,
        };

        let session_ttl_days = match std::env::var("SESSION_TTL_DAYS") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "SESSION_TTL_DAYS".to_string(),
                    format!("'{}' is not a number of days", raw),
                )
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            doctor_service_url,
            remote_timeout: Duration::from_secs(remote_timeout_secs),
            session_ttl_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env mutations cannot race each other.
    #[test]
    fn from_env_applies_defaults_and_normalizes_the_doctor_url() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/portal");
        for var in [
            "BIND_ADDRESS",
            "RUST_LOG",
            "DOCTOR_SERVICE_URL",
            "REMOTE_TIMEOUT_SECS",
            "SESSION_TTL_DAYS",
        ] {
            std::env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.doctor_service_url, "http://localhost:5001");
        assert_eq!(config.remote_timeout, Duration::from_secs(10));
        assert_eq!(config.session_ttl_days, 30);

        std::env::set_var("DOCTOR_SERVICE_URL", "http://doctors:5001/");
        let config = Config::from_env().unwrap();
        assert_eq!(config.doctor_service_url, "http://doctors:5001");
    }

    #[test]
    fn config_error_messages_name_the_variable() {
        let err = ConfigError::MissingVar("DATABASE_URL".to_string());
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
