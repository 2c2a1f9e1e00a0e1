//! services/storefront/src/error.rs
//!
//! Startup errors of the storefront service. Everything that can go wrong
//! once a connection is open is reported to the client over the socket.

use crate::config::ConfigError;
use axum::http::header::InvalidHeaderValue;
use bempolo_core::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `CATALOG_PATH` pointed at an invalid product list.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// `CORS_ORIGIN` is not usable as a header value.
    #[error("Invalid CORS origin: {0}")]
    Cors(#[from] InvalidHeaderValue),

    /// Reading the catalog file or binding the listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
