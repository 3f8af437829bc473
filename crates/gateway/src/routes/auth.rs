//! OAuth route handlers.
//!
//! `GET /auth` starts the platform OAuth dance; `GET /auth/callback`
//! completes it and runs merchant provisioning (webhook subscriptions +
//! backend registration) before sending the merchant back to their admin.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::platform::{CallbackParams, PlatformAdapter};
use crate::provisioning::{ProvisionRequest, provision};
use crate::state::AppState;

/// Begin the OAuth flow for a shop.
///
/// # Route
///
/// `GET /auth?shop={shop-domain}`
#[instrument(skip(state))]
pub async fn begin(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Redirect> {
    let shop = query
        .get("shop")
        .filter(|shop| !shop.is_empty())
        .ok_or_else(|| AppError::BadRequest("missing shop query param".to_string()))?;

    let redirect = state.shopify().begin_auth(shop)?;
    Ok(Redirect::to(&redirect))
}

/// Complete the OAuth flow and provision the merchant.
///
/// The platform authenticates the callback itself (Shopify's `hmac` query
/// digest); on success the shop's webhook topics are subscribed and the
/// merchant is registered with the backend. Optional `email` and
/// `webhook_url` query params override the platform-resolved values.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Redirect> {
    let request = ProvisionRequest {
        email: query.get("email").cloned().filter(|e| !e.is_empty()),
        webhook_url: query.get("webhook_url").cloned().filter(|u| !u.is_empty()),
    };

    let params: CallbackParams = query.into_iter().collect();
    let session = state.shopify().complete_auth(&params).await?;

    provision(
        state.shopify(),
        state.backend(),
        &session,
        &state.config().webhook_callback_url,
        &request,
    )
    .await?;

    Ok(Redirect::to(&format!("https://{}/admin/apps", session.shop)))
}
