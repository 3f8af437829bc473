//! Platform payload normalization.
//!
//! Maps a platform-specific webhook payload into a [`CanonicalEvent`].
//! Normalization is a total function: malformed, unknown, or missing inputs
//! degrade to the documented conservative defaults (`order_created`,
//! `pending`, total 0, ingestion-time timestamp) instead of erroring,
//! because upstream platforms introduce new topics at any time and
//! ingestion must not drop traffic over them.
//!
//! Each platform is a plain lookup-table module, not a trait hierarchy:
//! adding a platform means a new [`Platform`] variant and a new table
//! module here.

pub mod shopify;
pub mod woocommerce;

use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::types::{CanonicalEvent, FinancialStatus, Platform};

/// A parsed inbound webhook, ready for normalization.
///
/// `topic` is the platform's name for the event kind (e.g. `orders/paid`).
/// WooCommerce deliveries carry no topic string - their event type arrives
/// in-band - so the topic may be empty there.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    /// Platform-qualified store identifier.
    pub shop_id: String,
    pub platform: Platform,
    pub topic: String,
    /// Loosely-typed payload; unparseable bodies arrive as an opaque string.
    pub body: Value,
}

/// Normalize a webhook delivery into the canonical event schema.
#[must_use]
pub fn normalize(delivery: &WebhookDelivery) -> CanonicalEvent {
    match delivery.platform {
        Platform::Shopify => shopify::normalize(delivery),
        Platform::Woocommerce => woocommerce::normalize(delivery),
    }
}

/// Resolve a payload-declared status field against a platform's table.
///
/// Non-string and unknown values resolve to `None`; the caller applies the
/// conservative default.
pub(crate) fn declared_status(
    table: &[(&str, FinancialStatus)],
    value: Option<&Value>,
) -> Option<FinancialStatus> {
    let status = value?.as_str()?.to_lowercase();
    lookup(table, &status)
}

/// Scan a lookup table for an exact (already lower-cased) key.
pub(crate) fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

/// View the payload as a JSON object, if it is one.
///
/// Arrays, scalars, and opaque raw strings have no fields to extract; every
/// resolution step then falls back to its default.
pub(crate) fn as_object(body: &Value) -> Option<&Map<String, Value>> {
    body.as_object()
}

/// Parse a monetary amount from a loosely-typed payload field.
///
/// Accepts JSON numbers and numeric strings (plain or scientific notation).
/// Negative values are treated as unresolvable: the canonical total is
/// non-negative by contract.
pub(crate) fn parse_amount(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        // Serde guarantees JSON numbers are finite; go through the string
        // form so decimals like 99.99 stay exact.
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };

    parsed.filter(|amount| !amount.is_sign_negative())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Extract the event time from the payload: the first of the given fields
/// holding a non-empty string, passed through verbatim.
pub(crate) fn extract_timestamp(body: &Value, fields: &[&str]) -> Option<String> {
    let object = as_object(body)?;
    fields
        .iter()
        .filter_map(|field| object.get(*field)?.as_str())
        .find(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// The ingestion-time fallback timestamp, ISO-8601 in UTC.
pub(crate) fn ingestion_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
