//! Merchant provisioning orchestrator.
//!
//! Drives the once-per-OAuth-completion sequence
//! `authenticated -> webhooks registered -> merchant registered`:
//! subscribe the required webhook topics concurrently, resolve the
//! merchant's alert email, and register the merchant with the analytics
//! backend.
//!
//! The whole sequence is safe to re-run when a merchant revisits the OAuth
//! flow: topic subscription and merchant registration are both upserts on
//! the receiving side, so re-issuing them is a no-op from the caller's
//! perspective. There is no local dedup table - idempotency is a documented
//! property of the collaborators, not of this module.

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{info, instrument};

use cartpulse_core::{RegisterMerchant, RegistrationAck};

use crate::backend::{BackendClient, BackendError};
use crate::platform::{PlatformAdapter, PlatformError, PlatformSession};

/// Webhook topics every provisioned shop must be subscribed to.
pub const REQUIRED_TOPICS: &[&str] = &[
    "checkouts/create",
    "orders/create",
    "orders/paid",
    "orders/cancelled",
];

/// Caller-supplied provisioning inputs from the OAuth callback.
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
    /// Alert email; when absent the platform's shop record supplies it.
    pub email: Option<String>,
    /// Optional webhook mirror URL to register with the backend.
    pub webhook_url: Option<String>,
}

/// Errors that abort provisioning.
///
/// Each variant names the transition that failed; a failed transition
/// leaves provisioning incomplete and must surface to the caller.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// At least one required topic subscription failed; the shop is not
    /// fully wired and merchant registration was not attempted.
    #[error("Webhook registration incomplete: {0}")]
    Subscription(#[source] PlatformError),

    /// No usable alert email: none supplied and the platform lookup failed.
    #[error("Could not resolve merchant email: {0}")]
    Email(#[source] PlatformError),

    /// The backend rejected the merchant registration.
    #[error("Merchant registration failed: {0}")]
    Registration(#[from] BackendError),
}

/// Provision a freshly authenticated shop.
///
/// Subscriptions for all required topics are issued concurrently and the
/// join fails if any single one fails - three successes out of four is an
/// incomplete provisioning, not a partial success.
///
/// # Errors
///
/// Returns [`ProvisionError`] naming the first transition that failed.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn provision<P: PlatformAdapter>(
    platform: &P,
    backend: &BackendClient,
    session: &PlatformSession,
    callback_address: &str,
    request: &ProvisionRequest,
) -> Result<Option<RegistrationAck>, ProvisionError> {
    try_join_all(
        REQUIRED_TOPICS
            .iter()
            .map(|topic| platform.subscribe_webhook(session, topic, callback_address)),
    )
    .await
    .map_err(ProvisionError::Subscription)?;

    info!(topics = REQUIRED_TOPICS.len(), "Webhooks registered");

    let email = match request.email.as_deref() {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => {
            platform
                .get_shop_info(session)
                .await
                .map_err(ProvisionError::Email)?
                .email
        }
    };

    let ack = backend
        .register_merchant(&RegisterMerchant {
            shop_id: session.shop.clone(),
            platform: platform.platform(),
            email,
            webhook_url: request.webhook_url.clone(),
            alerts_enabled: true,
        })
        .await?;

    info!("Merchant registered");

    Ok(ack)
}
