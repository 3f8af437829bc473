//! Shopify platform adapter.
//!
//! Implements the adapter capability over Shopify's OAuth and Admin REST
//! endpoints:
//! - `GET https://{shop}/admin/oauth/authorize` (redirect target)
//! - `POST https://{shop}/admin/oauth/access_token` (code exchange)
//! - `POST https://{shop}/admin/api/{version}/webhooks.json` (subscription)
//! - `GET https://{shop}/admin/api/{version}/shop.json` (shop info)

use hmac::{Hmac, Mac};
use rand::Rng;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, instrument};

use super::{CallbackParams, PlatformAdapter, PlatformError, PlatformSession, ShopInfo};
use crate::config::ShopifyConfig;

type HmacSha256 = Hmac<Sha256>;

/// Length of the OAuth state nonce.
const STATE_LENGTH: usize = 32;

/// Shopify Admin API adapter.
#[derive(Clone)]
pub struct ShopifyPlatform {
    /// HTTP client.
    client: Client,
    /// OAuth client ID.
    api_key: String,
    /// OAuth client secret; also keys the callback hmac validation.
    api_secret: SecretString,
    /// Admin API version (e.g. 2026-01).
    api_version: String,
    /// Comma-separated OAuth scopes.
    scopes: String,
    /// OAuth redirect URI, derived from the gateway's public base URL.
    redirect_uri: String,
}

impl std::fmt::Debug for ShopifyPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyPlatform")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("scopes", &self.scopes)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl ShopifyPlatform {
    /// Create a new Shopify adapter.
    ///
    /// `base_url` is the gateway's public URL; the OAuth callback lands at
    /// `{base_url}/auth/callback`.
    #[must_use]
    pub fn new(config: &ShopifyConfig, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_version: config.api_version.clone(),
            scopes: config.scopes.clone(),
            redirect_uri: format!("{}/auth/callback", base_url.trim_end_matches('/')),
        }
    }

    /// Validate the `hmac` query parameter Shopify appends to OAuth
    /// callbacks: a hex HMAC-SHA256 over the remaining query parameters in
    /// key order, keyed by the app secret.
    fn valid_callback_hmac(&self, params: &CallbackParams) -> bool {
        let Some(presented) = params.get("hmac") else {
            return false;
        };
        let Ok(presented) = hex::decode(presented) else {
            return false;
        };

        let message = params
            .iter()
            .filter(|(key, _)| *key != "hmac" && *key != "signature")
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let Ok(mut mac) = HmacSha256::new_from_slice(self.api_secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(message.as_bytes());
        mac.verify_slice(&presented).is_ok()
    }
}

impl PlatformAdapter for ShopifyPlatform {
    fn platform(&self) -> cartpulse_core::Platform {
        cartpulse_core::Platform::Shopify
    }

    fn begin_auth(&self, shop: &str) -> Result<String, PlatformError> {
        validate_shop_domain(shop)?;

        let state = generate_state(STATE_LENGTH);
        Ok(format!(
            "https://{shop}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={state}",
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.scopes),
            urlencoding::encode(&self.redirect_uri),
        ))
    }

    #[instrument(skip(self, params))]
    async fn complete_auth(
        &self,
        params: &CallbackParams,
    ) -> Result<PlatformSession, PlatformError> {
        if !self.valid_callback_hmac(params) {
            return Err(PlatformError::InvalidCallback(
                "hmac validation failed".to_string(),
            ));
        }

        let shop = params
            .get("shop")
            .ok_or_else(|| PlatformError::InvalidCallback("missing shop".to_string()))?
            .to_string();
        validate_shop_domain(&shop)?;

        let code = params
            .get("code")
            .ok_or_else(|| PlatformError::InvalidCallback("missing code".to_string()))?;

        let response = self
            .client
            .post(format!("https://{shop}/admin/oauth/access_token"))
            .json(&serde_json::json!({
                "client_id": self.api_key,
                "client_secret": self.api_secret.expose_secret(),
                "code": code,
            }))
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Response(e.to_string()))?;

        debug!(shop = %shop, "OAuth code exchanged");

        Ok(PlatformSession {
            shop,
            access_token: SecretString::from(token.access_token),
        })
    }

    #[instrument(skip(self, session, address), fields(shop = %session.shop, topic = %topic))]
    async fn subscribe_webhook(
        &self,
        session: &PlatformSession,
        topic: &str,
        address: &str,
    ) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(format!(
                "https://{}/admin/api/{}/webhooks.json",
                session.shop, self.api_version
            ))
            .header("X-Shopify-Access-Token", session.access_token.expose_secret())
            .json(&serde_json::json!({
                "webhook": {
                    "topic": topic,
                    "address": address,
                    "format": "json",
                }
            }))
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message: format!("webhook subscription for {topic} rejected: {body}"),
            });
        }

        debug!("Webhook subscribed");

        Ok(())
    }

    #[instrument(skip(self, session), fields(shop = %session.shop))]
    async fn get_shop_info(&self, session: &PlatformSession) -> Result<ShopInfo, PlatformError> {
        let response = self
            .client
            .get(format!(
                "https://{}/admin/api/{}/shop.json",
                session.shop, self.api_version
            ))
            .header("X-Shopify-Access-Token", session.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ShopEnvelope = response
            .json()
            .await
            .map_err(|e| PlatformError::Response(e.to_string()))?;

        match body.shop.and_then(|shop| shop.email) {
            Some(email) if !email.is_empty() => Ok(ShopInfo { email }),
            _ => Err(PlatformError::MissingEmail),
        }
    }
}

/// Response of the OAuth code exchange.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Envelope of `shop.json`.
#[derive(Debug, Deserialize)]
struct ShopEnvelope {
    shop: Option<ShopRecord>,
}

#[derive(Debug, Deserialize)]
struct ShopRecord {
    email: Option<String>,
}

/// Reject shop values that cannot be a hostname.
///
/// The shop identifier is interpolated into request URLs; anything with a
/// path separator or scheme would redirect those requests elsewhere.
fn validate_shop_domain(shop: &str) -> Result<(), PlatformError> {
    let valid = !shop.is_empty()
        && shop
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(PlatformError::InvalidShop(shop.to_string()))
    }
}

/// Generate a random URL-safe state nonce.
fn generate_state(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).unwrap_or(&b'0'))
        })
        .collect()
}
