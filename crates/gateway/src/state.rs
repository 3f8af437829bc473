//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::GatewayConfig;
use crate::platform::ShopifyPlatform;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Ingestion itself is stateless - this only
/// carries the configuration and the outbound clients, none of which hold
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    backend: BackendClient,
    shopify: ShopifyPlatform,
}

impl AppState {
    /// Create a new application state from loaded configuration.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let shopify = ShopifyPlatform::new(&config.shopify, &config.base_url);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                shopify,
            }),
        }
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the analytics backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the Shopify platform adapter.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyPlatform {
        &self.inner.shopify
    }
}
