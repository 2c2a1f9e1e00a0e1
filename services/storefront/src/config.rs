//! services/storefront/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Endpoint that emails download links.
    pub delivery_url: String,
    /// Optional JSON product list replacing the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    pub cors_origin: String,
    pub demo_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        // --- Storefront Settings ---
        let delivery_url = lookup("DELIVERY_URL")
            .unwrap_or_else(|| "http://localhost:3000/api/send-download".to_string());
        if !delivery_url.starts_with("http://") && !delivery_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "DELIVERY_URL".to_string(),
                format!("'{}' is not an http(s) URL", delivery_url),
            ));
        }

        let catalog_path = lookup("CATALOG_PATH").map(PathBuf::from);

        let demo_delay = match lookup("DEMO_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("DEMO_DELAY_MS".to_string(), e.to_string())
            })?),
            None => Duration::from_millis(2500),
        };

        Ok(Self {
            bind_address,
            log_level,
            delivery_url,
            catalog_path,
            cors_origin,
            demo_delay,
        })
    }
}
