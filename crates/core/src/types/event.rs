//! The canonical checkout-lifecycle event schema.
//!
//! Every inbound platform payload is normalized into [`CanonicalEvent`]
//! before it is forwarded downstream. The schema is deliberately total:
//! every field is always present, and unknown or missing inputs resolve to
//! documented defaults during normalization rather than to absent fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source platform an event originated from.
///
/// Adding a platform means adding a variant here plus a lookup table in
/// [`crate::normalize`] - there is no per-platform class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Shopify,
    Woocommerce,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shopify => write!(f, "shopify"),
            Self::Woocommerce => write!(f, "woocommerce"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shopify" => Ok(Self::Shopify),
            "woocommerce" => Ok(Self::Woocommerce),
            _ => Err(format!("unknown platform: {s}")),
        }
    }
}

/// Canonical lifecycle stage of a checkout/order event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CheckoutStarted,
    /// The conservative default for unrecognized topics.
    #[default]
    OrderCreated,
    OrderFailed,
}

/// Canonical payment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    /// The conservative default for unrecognized statuses.
    #[default]
    Pending,
    Paid,
    Failed,
}

/// The single schema all platform events converge to.
///
/// `order_total` is in currency-major units (e.g. 99.99 USD, not 9999
/// cents) and serializes as a JSON number. `timestamp` carries whatever
/// ISO-8601 string the payload supplied, or the ingestion time when the
/// payload had none. `raw_payload` is the verbatim inbound body, preserved
/// for downstream audit and never interpreted further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Platform-qualified store identifier. Never empty.
    pub shop_id: String,
    pub source_platform: Platform,
    pub event_type: EventType,
    pub financial_status: FinancialStatus,
    /// Non-negative monetary amount in currency-major units. 0 when the
    /// payload carried nothing parseable.
    #[serde(with = "rust_decimal::serde::float")]
    pub order_total: Decimal,
    /// ISO-8601 event time; ingestion time if the payload lacked one.
    pub timestamp: String,
    /// Original payload, verbatim.
    pub raw_payload: serde_json::Value,
}
