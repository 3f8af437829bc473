//! Webhook ingestion route handlers.
//!
//! One handler per platform, all following the same pipeline: verify the
//! signature over the raw request bytes, tolerantly parse the body,
//! normalize into the canonical schema, forward to the backend. A webhook
//! that fails verification is rejected before any parsing; a webhook that
//! fails forwarding is answered with 502 so the platform redelivers - this
//! layer never retries on its own.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use cartpulse_core::{Platform, WebhookDelivery, normalize, verify};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Shopify signature header (base64 HMAC-SHA256 of the raw body).
const SHOPIFY_HMAC_HEADER: &str = "x-shopify-hmac-sha256";
/// Shopify webhook topic header.
const SHOPIFY_TOPIC_HEADER: &str = "x-shopify-topic";
/// Shopify shop domain header.
const SHOPIFY_SHOP_HEADER: &str = "x-shopify-shop-domain";

/// WooCommerce signature header (same base64 HMAC-SHA256 scheme).
const WOO_SIGNATURE_HEADER: &str = "x-wc-webhook-signature";
/// WooCommerce source store header.
const WOO_SOURCE_HEADER: &str = "x-wc-webhook-source";

/// Ingest a Shopify webhook.
///
/// # Route
///
/// `POST /webhooks/shopify`
#[instrument(skip_all)]
pub async fn shopify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    verify_or_reject(&state, &headers, SHOPIFY_HMAC_HEADER, &body)?;

    // Header fallbacks match upstream behavior: a delivery with missing
    // metadata is still ingested, attributed to "unknown"
    let topic = header_str(&headers, SHOPIFY_TOPIC_HEADER).unwrap_or("unknown");
    let shop_id = header_str(&headers, SHOPIFY_SHOP_HEADER).unwrap_or("unknown");

    let delivery = WebhookDelivery {
        shop_id: shop_id.to_string(),
        platform: Platform::Shopify,
        topic: topic.to_string(),
        body: parse_body(&body),
    };

    ingest(&state, delivery).await
}

/// Ingest a WooCommerce delivery.
///
/// WooCommerce carries no topic header the normalizer uses; the event type
/// arrives in-band in the payload.
///
/// # Route
///
/// `POST /webhooks/woocommerce`
#[instrument(skip_all)]
pub async fn woocommerce(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    verify_or_reject(&state, &headers, WOO_SIGNATURE_HEADER, &body)?;

    let parsed = parse_body(&body);
    let shop_id = parsed
        .get("shop_id")
        .and_then(Value::as_str)
        .or_else(|| header_str(&headers, WOO_SOURCE_HEADER))
        .unwrap_or("unknown")
        .to_string();

    let delivery = WebhookDelivery {
        shop_id,
        platform: Platform::Woocommerce,
        topic: String::new(),
        body: parsed,
    };

    ingest(&state, delivery).await
}

/// Verify the delivery signature over the raw, untouched request bytes.
///
/// A missing header verifies as an empty signature, which always rejects.
fn verify_or_reject(
    state: &AppState,
    headers: &HeaderMap,
    signature_header: &str,
    body: &Bytes,
) -> Result<()> {
    let signature = header_str(headers, signature_header).unwrap_or("");
    let secret = state.config().webhook_secret.expose_secret();

    if verify(body, signature, secret) {
        Ok(())
    } else {
        Err(AppError::Authentication(
            "invalid webhook signature".to_string(),
        ))
    }
}

/// Normalize and forward one verified delivery.
async fn ingest(state: &AppState, delivery: WebhookDelivery) -> Result<Json<Value>> {
    let event = normalize(&delivery);
    debug!(
        shop_id = %event.shop_id,
        event_type = ?event.event_type,
        "Webhook normalized"
    );

    state.backend().forward_event(&event).await?;

    Ok(Json(json!({ "ok": true })))
}

/// Tolerant body parsing: valid JSON becomes structured, anything else is
/// preserved as an opaque raw string rather than failing the request.
fn parse_body(body: &Bytes) -> Value {
    if body.is_empty() {
        return json!({});
    }

    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Read a header as a string, if present and valid UTF-8.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
