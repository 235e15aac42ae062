//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target local development against the
//! public Platzi Fake Store API.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8000)
//! - `STOREFRONT_BASE_URL` - Public URL of the site (default: <http://localhost:8000>)
//! - `CATALOG_API_URL` - Catalog API base URL (default: <https://api.escuelajs.co/api/v1/>)
//! - `CATALOG_LIST_TIMEOUT_SECS` - Timeout for the full product list (default: 20)
//! - `CATALOG_WRITE_TIMEOUT_SECS` - Timeout for create and category calls (default: 10)
//! - `CATALOG_ITEM_TIMEOUT_SECS` - Timeout for single-product read/update/delete (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default upstream catalog API.
pub const DEFAULT_CATALOG_API_URL: &str = "https://api.escuelajs.co/api/v1/";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Upstream catalog API settings
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Upstream catalog API endpoint and per-call timeouts.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; always ends with `/` so relative joins append.
    pub base_url: Url,
    /// Timeout for `GET products/`.
    pub list_timeout: Duration,
    /// Timeout for `POST products/` and `GET categories/`.
    pub write_timeout: Duration,
    /// Timeout for `GET`, `PUT` and `DELETE` on `products/{id}`.
    pub item_timeout: Duration,
}

impl CatalogConfig {
    /// Build a catalog config with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("CATALOG_API_URL", base_url)?,
            list_timeout: Duration::from_secs(20),
            write_timeout: Duration::from_secs(10),
            item_timeout: Duration::from_secs(5),
        })
    }

    /// Use one timeout for every call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self.write_timeout = timeout;
        self.item_timeout = timeout;
        self
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_env_or_default("CATALOG_API_URL", DEFAULT_CATALOG_API_URL);
        let mut config = Self::new(&base_url)?;
        config.list_timeout = get_secs_or_default("CATALOG_LIST_TIMEOUT_SECS", config.list_timeout)?;
        config.write_timeout =
            get_secs_or_default("CATALOG_WRITE_TIMEOUT_SECS", config.write_timeout)?;
        config.item_timeout = get_secs_or_default("CATALOG_ITEM_TIMEOUT_SECS", config.item_timeout)?;
        Ok(config)
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:8000");
        parse_base_url("STOREFRONT_BASE_URL", &base_url)?;

        Ok(Self {
            host,
            port,
            base_url,
            catalog: CatalogConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and local tooling: loopback bind, no Sentry.
    #[must_use]
    pub fn for_catalog(catalog: CatalogConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            catalog,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the cookie `Secure` flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a whole number of seconds, falling back to `default` when unset.
fn get_secs_or_default(key: &str, default: Duration) -> Result<Duration, ConfigError> {
    match get_optional_env(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "timeout must be at least 1 second".to_string(),
            )),
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        },
    }
}

/// Parse an absolute http(s) URL, forcing a trailing slash on the path.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
