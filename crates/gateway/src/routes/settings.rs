//! Merchant settings and deactivation route handlers.
//!
//! Thin pass-throughs to the analytics backend: the gateway holds no
//! settings of its own.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{instrument, warn};

use cartpulse_core::{MerchantSettings, SettingsUpdate};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the settings lookup.
#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub shop_id: Option<String>,
}

/// Settings update form.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub shop_id: String,
    #[serde(default)]
    pub email: String,
    pub webhook_url: Option<String>,
    #[serde(default = "default_alerts_enabled")]
    pub alerts_enabled: bool,
}

const fn default_alerts_enabled() -> bool {
    true
}

/// Deactivation notice body.
#[derive(Debug, Deserialize)]
pub struct DeactivateForm {
    pub shop_id: String,
}

/// Fetch a merchant's settings.
///
/// A shop the backend has never seen answers 404 - an explicit absence,
/// not a failure.
///
/// # Route
///
/// `GET /api/settings?shop_id={shop-id}`
#[instrument(skip(state))]
pub async fn fetch(
    State(state): State<AppState>,
    Query(query): Query<SettingsQuery>,
) -> Result<Json<MerchantSettings>> {
    let shop_id = query
        .shop_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("shop_id is required".to_string()))?;

    match state.backend().get_settings(&shop_id).await? {
        Some(settings) => Ok(Json(settings)),
        None => Err(AppError::NotFound(shop_id)),
    }
}

/// Update a merchant's settings.
///
/// # Route
///
/// `POST /api/settings`
#[instrument(skip_all, fields(shop_id = %form.shop_id))]
pub async fn update(
    State(state): State<AppState>,
    Json(form): Json<SettingsForm>,
) -> Result<Json<Value>> {
    if form.shop_id.is_empty() {
        return Err(AppError::BadRequest("shop_id is required".to_string()));
    }
    if form.email.is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()));
    }

    state
        .backend()
        .update_settings(&SettingsUpdate {
            shop_id: form.shop_id,
            email: form.email,
            webhook_url: form.webhook_url,
            alerts_enabled: form.alerts_enabled,
        })
        .await?;

    Ok(Json(json!({ "ok": true })))
}

/// Accept a deactivation notice from a store plugin.
///
/// The backend notification is fire-and-forget: it is spawned off the
/// request, its failure only reaches the logs, and the response never
/// waits on it. Deactivation must not be blockable by backend downtime.
///
/// # Route
///
/// `POST /api/deactivate`
#[instrument(skip_all, fields(shop_id = %form.shop_id))]
pub async fn deactivate(
    State(state): State<AppState>,
    Json(form): Json<DeactivateForm>,
) -> Json<Value> {
    let backend = state.backend().clone();
    let shop_id = form.shop_id;

    tokio::spawn(async move {
        if let Err(e) = backend.notify_deactivated(&shop_id).await {
            warn!(shop_id = %shop_id, error = %e, "Deactivation notice failed");
        }
    });

    Json(json!({ "ok": true }))
}
