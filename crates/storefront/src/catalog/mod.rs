//! Client for the upstream catalog REST API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth; nothing is cached or stored
//!   locally, every page view fetches fresh data
//! - Each call carries its own timeout from [`CatalogConfig`]; there are no
//!   retries
//! - Callers decide how to degrade on failure (see `services::catalog`)
//!
//! # Endpoints
//!
//! - `GET products/`, `POST products/`
//! - `GET|PUT|DELETE products/{id}`
//! - `GET categories/`
//!
//! [`CatalogConfig`]: crate::config::CatalogConfig

mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure: connection refused, DNS, TLS, or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{operation} returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: StatusCode,
    },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CatalogError {
    /// Whether the failure was the per-call timeout firing.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Whether the API reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
