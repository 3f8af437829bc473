//! Analytics backend HTTP client.

use cartpulse_core::{
    CanonicalEvent, MerchantSettings, RegisterMerchant, RegistrationAck, SettingsUpdate,
};
use reqwest::{Client, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::BackendError;
use crate::config::BackendConfig;

/// Client for the analytics backend.
///
/// Injects the bearer API key on every call and applies the backend's
/// 404-as-absence convention: a 404 never surfaces as an error, only as a
/// missing value.
#[derive(Clone)]
pub struct BackendClient {
    /// HTTP client.
    client: Client,
    /// Backend base URL, trailing slash already trimmed.
    base_url: String,
    /// Bearer token for authentication.
    api_key: SecretString,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Register a merchant with the backend.
    ///
    /// Re-registering the same shop is an upsert on the backend side and is
    /// safe to re-issue; the returned acknowledgement may carry a
    /// backend-issued API key on first registration.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, registration), fields(shop_id = %registration.shop_id, platform = %registration.platform))]
    pub async fn register_merchant(
        &self,
        registration: &RegisterMerchant,
    ) -> Result<Option<RegistrationAck>, BackendError> {
        let body = self
            .send(Method::POST, "/api/merchants/register", Some(registration))
            .await?;

        let ack: Option<RegistrationAck> = body
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| BackendError::Response(e.to_string()))?;

        let issued_api_key = ack.as_ref().is_some_and(|a| a.api_key.is_some());
        debug!(issued_api_key, "Merchant registered");

        Ok(ack)
    }

    /// Update a merchant's mutable settings (alert email, mirror URL).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self, update), fields(shop_id = %update.shop_id))]
    pub async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<Option<MerchantSettings>, BackendError> {
        let body = self
            .send(Method::PATCH, "/api/merchants/settings", Some(update))
            .await?;

        body.map(serde_json::from_value)
            .transpose()
            .map_err(|e| BackendError::Response(e.to_string()))
    }

    /// Fetch a merchant's settings.
    ///
    /// A 404 from the backend means the shop has no settings yet and is
    /// returned as `Ok(None)`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend returns a non-2xx,
    /// non-404 response.
    #[instrument(skip(self))]
    pub async fn get_settings(
        &self,
        shop_id: &str,
    ) -> Result<Option<MerchantSettings>, BackendError> {
        let path = format!(
            "/api/merchants/settings?shop_id={}",
            urlencoding::encode(shop_id)
        );
        let body = self.send::<()>(Method::GET, &path, None).await?;

        body.map(serde_json::from_value)
            .transpose()
            .map_err(|e| BackendError::Response(e.to_string()))
    }

    /// Forward a canonical event to the backend's event sink.
    ///
    /// One round-trip, no retry: upstream redelivery is the retry path.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the event.
    #[instrument(skip(self, event), fields(shop_id = %event.shop_id, event_type = ?event.event_type))]
    pub async fn forward_event(&self, event: &CanonicalEvent) -> Result<(), BackendError> {
        self.send(Method::POST, "/events", Some(event)).await?;
        debug!("Event forwarded");
        Ok(())
    }

    /// Tell the backend a store deactivated the integration.
    ///
    /// Callers treat this as best-effort: it is issued fire-and-forget from
    /// the deactivation path and its result only reaches the logs.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn notify_deactivated(&self, shop_id: &str) -> Result<(), BackendError> {
        #[derive(Serialize)]
        struct Deactivation<'a> {
            shop_id: &'a str,
        }

        self.send(
            Method::POST,
            "/api/merchants/deactivate",
            Some(&Deactivation { shop_id }),
        )
        .await?;
        Ok(())
    }

    /// Issue one authenticated JSON round-trip.
    ///
    /// Returns `Ok(None)` for a 404 or for a 2xx response without a JSON
    /// body; non-2xx, non-404 responses become [`BackendError::Api`] with
    /// the status and body text.
    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Option<Value>, BackendError> {
        let url = format!("{}{path}", self.base_url);

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(self.api_key.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;
        Ok(serde_json::from_str(&text).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: "https://backend.example.com/".to_string(),
            api_key: SecretString::from("backend_api_key"),
        })
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug_output = format!("{:?}", test_client());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("backend_api_key"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed_from_base_url() {
        let client = test_client();
        assert_eq!(client.base_url, "https://backend.example.com");
    }
}
