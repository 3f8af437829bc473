//! Merchant registration and settings types.
//!
//! These are the request/response bodies exchanged with the analytics
//! backend. `shop_id`, `platform`, and the backend-issued `api_key` are
//! immutable after registration; settings updates only touch the alert email
//! and the optional webhook mirror URL.

use serde::{Deserialize, Serialize};

use super::event::Platform;

/// Registration request sent to the backend once per store, on OAuth
/// completion (or plugin activation on platforms without OAuth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterMerchant {
    pub shop_id: String,
    pub platform: Platform,
    /// Alert email. Required - the backend rejects empty emails.
    pub email: String,
    /// Optional mirror URL the backend forwards alerts to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub alerts_enabled: bool,
}

/// Backend acknowledgement of a registration.
///
/// The backend may issue an API key on first registration; re-registering
/// the same store is an upsert and may return the same record with no new
/// key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationAck {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Settings update request. Only mutable fields appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub shop_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub alerts_enabled: bool,
}

/// Merchant settings as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantSettings {
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub alerts_enabled: Option<bool>,
}
