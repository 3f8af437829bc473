//! Shopify webhook normalization tables.
//!
//! Shopify identifies the event kind by webhook topic (`X-Shopify-Topic`)
//! and states amounts as decimal strings in currency-major units.

use rust_decimal::Decimal;

use super::{
    WebhookDelivery, as_object, declared_status, extract_timestamp, ingestion_timestamp, lookup,
    parse_amount,
};
use crate::types::{CanonicalEvent, EventType, FinancialStatus, Platform};

/// Topic -> lifecycle stage. Unlisted topics are order activity.
const TOPIC_EVENT_TYPES: &[(&str, EventType)] = &[
    ("checkouts/create", EventType::CheckoutStarted),
    ("orders/cancelled", EventType::OrderFailed),
];

/// Topic -> payment outcome. The topic outranks whatever the payload
/// declares; only unlisted topics fall through to `financial_status`.
const TOPIC_FINANCIAL_STATUSES: &[(&str, FinancialStatus)] = &[
    ("checkouts/create", FinancialStatus::Pending),
    ("orders/paid", FinancialStatus::Paid),
    ("orders/cancelled", FinancialStatus::Failed),
];

/// Payload `financial_status` -> payment outcome. Shopify's richer status
/// vocabulary collapses onto the canonical three; anything unlisted
/// (authorized, partially_paid, ...) stays `Pending`.
const DECLARED_FINANCIAL_STATUSES: &[(&str, FinancialStatus)] = &[
    ("paid", FinancialStatus::Paid),
    ("voided", FinancialStatus::Failed),
    ("refunded", FinancialStatus::Failed),
    ("partially_refunded", FinancialStatus::Failed),
    ("cancelled", FinancialStatus::Failed),
];

/// Amount fields in preference order. Checkout payloads carry
/// `total_price`/`subtotal_price`; order payloads may only have the
/// `current_*` / line-item forms.
const TOTAL_FIELDS: &[&str] = &[
    "total_price",
    "subtotal_price",
    "current_total_price",
    "total_line_items_price",
];

/// Event-time fields in preference order.
const TIMESTAMP_FIELDS: &[&str] = &["processed_at", "created_at", "updated_at"];

/// Normalize a Shopify webhook delivery.
pub(super) fn normalize(delivery: &WebhookDelivery) -> CanonicalEvent {
    let topic = delivery.topic.to_lowercase();
    let body = &delivery.body;

    let event_type = lookup(TOPIC_EVENT_TYPES, &topic).unwrap_or_default();

    let financial_status = lookup(TOPIC_FINANCIAL_STATUSES, &topic)
        .or_else(|| {
            declared_status(
                DECLARED_FINANCIAL_STATUSES,
                as_object(body).and_then(|o| o.get("financial_status")),
            )
        })
        .unwrap_or_default();

    let order_total = as_object(body)
        .and_then(|object| {
            TOTAL_FIELDS
                .iter()
                .filter_map(|field| object.get(*field))
                .find_map(parse_amount)
        })
        .unwrap_or(Decimal::ZERO);

    let timestamp =
        extract_timestamp(body, TIMESTAMP_FIELDS).unwrap_or_else(ingestion_timestamp);

    CanonicalEvent {
        shop_id: delivery.shop_id.clone(),
        source_platform: Platform::Shopify,
        event_type,
        financial_status,
        order_total,
        timestamp,
        raw_payload: body.clone(),
    }
}
