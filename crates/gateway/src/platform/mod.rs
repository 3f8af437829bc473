//! Platform adapter capability.
//!
//! The gateway depends on four operations per commerce platform: begin the
//! OAuth redirect, complete the OAuth callback into a session, subscribe a
//! webhook topic, and fetch shop info (the merchant email). Everything else
//! about a platform - SDK shape, API flavor, auth dance details - stays
//! behind this seam, so provisioning can be tested against a scripted
//! adapter and new platforms slot in without touching the orchestrator.

mod shopify;

use std::collections::BTreeMap;

use secrecy::SecretString;
use thiserror::Error;

pub use shopify::ShopifyPlatform;

/// Errors from platform operations.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The HTTP request itself failed (connect, DNS, timeout).
    #[error("Platform request failed: {0}")]
    Request(String),

    /// The platform returned a non-2xx response.
    #[error("Platform returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The OAuth callback could not be authenticated or is malformed.
    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    /// The shop identifier is unusable.
    #[error("Invalid shop domain: {0}")]
    InvalidShop(String),

    /// The platform's shop record carries no email to alert.
    #[error("Shop email is missing from the platform response")]
    MissingEmail,

    /// The platform returned a 2xx response this client could not parse.
    #[error("Platform response parse error: {0}")]
    Response(String),
}

/// Raw query parameters of an OAuth callback request.
///
/// Kept as a sorted map because Shopify's callback digest is computed over
/// the lexicographically ordered query string.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    params: BTreeMap<String, String>,
}

impl CallbackParams {
    #[must_use]
    pub const fn new(params: BTreeMap<String, String>) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Iterate all parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for CallbackParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// An authenticated platform session for one shop.
#[derive(Clone)]
pub struct PlatformSession {
    /// Shop domain / identifier the session belongs to.
    pub shop: String,
    /// Access token for platform API calls.
    pub access_token: SecretString,
}

impl std::fmt::Debug for PlatformSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSession")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Shop details resolved from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopInfo {
    /// The shop owner's contact email.
    pub email: String,
}

/// The four platform operations the gateway depends on.
///
/// Callers are in-crate and always use concrete adapters, so the futures'
/// auto traits are known at every call site.
#[allow(async_fn_in_trait)]
pub trait PlatformAdapter {
    /// The platform variant this adapter speaks for.
    fn platform(&self) -> cartpulse_core::Platform;

    /// Build the OAuth authorization redirect URL for a shop.
    ///
    /// # Errors
    ///
    /// Returns error if the shop identifier is unusable.
    fn begin_auth(&self, shop: &str) -> Result<String, PlatformError>;

    /// Authenticate an OAuth callback and exchange it for a session.
    ///
    /// # Errors
    ///
    /// Returns error if the callback cannot be authenticated or the token
    /// exchange fails.
    async fn complete_auth(
        &self,
        params: &CallbackParams,
    ) -> Result<PlatformSession, PlatformError>;

    /// Subscribe one webhook topic at the given delivery address.
    ///
    /// Re-subscribing an existing topic/address pair is an upsert on the
    /// platform side; callers may re-issue freely.
    ///
    /// # Errors
    ///
    /// Returns error if the subscription is rejected.
    async fn subscribe_webhook(
        &self,
        session: &PlatformSession,
        topic: &str,
        address: &str,
    ) -> Result<(), PlatformError>;

    /// Fetch shop details (the merchant email) for a session.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails or the shop has no email.
    async fn get_shop_info(&self, session: &PlatformSession) -> Result<ShopInfo, PlatformError>;
}
