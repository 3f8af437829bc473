//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GATEWAY_BASE_URL` - Public URL of this gateway (OAuth redirect base)
//! - `WEBHOOK_SHARED_SECRET` - Shared secret for webhook signature verification
//! - `WEBHOOK_CALLBACK_URL` - Externally-reachable address registered with
//!   platforms when subscribing webhooks
//! - `BACKEND_URL` - Base URL of the analytics backend
//! - `BACKEND_API_KEY` - Bearer token for the analytics backend
//! - `SHOPIFY_API_KEY` - Shopify app OAuth client ID
//! - `SHOPIFY_API_SECRET` - Shopify app OAuth client secret
//!
//! ## Optional
//! - `GATEWAY_HOST` - Bind address (default: 127.0.0.1)
//! - `GATEWAY_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2026-01)
//! - `SHOPIFY_SCOPES` - OAuth scopes (default: read_orders,read_checkouts)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
///
/// Every variant is fatal at startup: the gateway never starts with a
/// partial configuration and never discovers a missing secret per-request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gateway application configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this gateway
    pub base_url: String,
    /// Shared secret for inbound webhook signatures
    pub webhook_secret: SecretString,
    /// Address handed to platforms when subscribing webhooks
    pub webhook_callback_url: String,
    /// Analytics backend configuration
    pub backend: BackendConfig,
    /// Shopify app configuration
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Analytics backend transport configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Backend base URL (trailing slash trimmed)
    pub base_url: String,
    /// Bearer token injected on every backend call
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Shopify app credentials and API version.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// OAuth client ID
    pub api_key: String,
    /// OAuth client secret (also keys the callback hmac validation)
    pub api_secret: SecretString,
    /// Admin API version (e.g. 2026-01)
    pub api_version: String,
    /// Comma-separated OAuth scopes
    pub scopes: String,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl GatewayConfig {
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

        let host = get_env_or_default("GATEWAY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("GATEWAY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_url("GATEWAY_BASE_URL")?;
        let webhook_secret = get_required_secret("WEBHOOK_SHARED_SECRET")?;
        let webhook_callback_url = get_required_url("WEBHOOK_CALLBACK_URL")?;

        let backend = BackendConfig::from_env()?;
        let shopify = ShopifyConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            webhook_secret,
            webhook_callback_url,
            backend,
            shopify,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: get_required_url("BACKEND_URL")?,
            api_key: get_required_secret("BACKEND_API_KEY")?,
        })
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_required_secret("SHOPIFY_API_SECRET")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            scopes: get_env_or_default("SHOPIFY_SCOPES", "read_orders,read_checkouts"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get a required environment variable that must parse as an absolute URL.
///
/// A trailing slash is trimmed so call sites can join paths with plain
/// formatting.
fn get_required_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
