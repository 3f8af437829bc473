//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # Webhook ingestion
//! POST /webhooks/shopify       - Shopify webhook deliveries
//! POST /webhooks/woocommerce   - WooCommerce plugin deliveries
//!
//! # OAuth / provisioning
//! GET  /auth                   - Begin platform OAuth
//! GET  /auth/callback          - Complete OAuth, provision merchant
//!
//! # Merchant settings
//! GET  /api/settings           - Fetch settings (404 = none yet)
//! POST /api/settings           - Update alert email / mirror URL
//! POST /api/deactivate         - Fire-and-forget deactivation notice
//! ```

pub mod auth;
pub mod settings;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the webhook ingestion router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route("/shopify", post(webhooks::shopify))
        .route("/woocommerce", post(webhooks::woocommerce))
}

/// Create the OAuth router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::begin))
        .route("/callback", get(auth::callback))
}

/// Create the settings/deactivation API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(settings::fetch).post(settings::update),
        )
        .route("/deactivate", post(settings::deactivate))
}

/// Create the complete gateway router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/webhooks", webhook_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
