//! WooCommerce event normalization tables.
//!
//! WooCommerce deliveries carry no topic string: the store plugin hooks
//! order lifecycle actions directly and states the event type in-band.
//! Amounts arrive as integer minor units (cents) and are scaled to the
//! canonical currency-major convention here.

use rust_decimal::Decimal;

use super::{
    WebhookDelivery, as_object, declared_status, extract_timestamp, ingestion_timestamp, lookup,
    parse_amount,
};
use crate::types::{CanonicalEvent, EventType, FinancialStatus, Platform};

/// In-band `event_type` -> lifecycle stage.
const EVENT_TYPES: &[(&str, EventType)] = &[
    ("checkout_started", EventType::CheckoutStarted),
    ("order_created", EventType::OrderCreated),
    ("order_failed", EventType::OrderFailed),
];

/// Plugin-declared `financial_status` -> payment outcome. The store plugin
/// only ever emits the canonical three.
const DECLARED_FINANCIAL_STATUSES: &[(&str, FinancialStatus)] = &[
    ("pending", FinancialStatus::Pending),
    ("paid", FinancialStatus::Paid),
    ("failed", FinancialStatus::Failed),
];

/// WooCommerce order `status` -> payment outcome, for payloads that do not
/// declare a `financial_status` outright.
const ORDER_STATUS_FINANCIAL: &[(&str, FinancialStatus)] = &[
    ("completed", FinancialStatus::Paid),
    ("processing", FinancialStatus::Pending),
    ("on-hold", FinancialStatus::Pending),
    ("pending", FinancialStatus::Pending),
    ("failed", FinancialStatus::Failed),
    ("cancelled", FinancialStatus::Failed),
    ("refunded", FinancialStatus::Failed),
];

/// Event-time fields in preference order. The plugin stamps `timestamp`;
/// the REST-shaped fields cover stores posting raw order objects.
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "date_created", "date_modified"];

/// Normalize a WooCommerce delivery.
pub(super) fn normalize(delivery: &WebhookDelivery) -> CanonicalEvent {
    let body = &delivery.body;
    let object = as_object(body);

    let event_type = object
        .and_then(|o| o.get("event_type")?.as_str())
        .and_then(|declared| lookup(EVENT_TYPES, &declared.to_lowercase()))
        .unwrap_or_default();

    let financial_status = declared_status(
        DECLARED_FINANCIAL_STATUSES,
        object.and_then(|o| o.get("financial_status")),
    )
    .or_else(|| {
        let status = object?.get("status")?.as_str()?.to_lowercase();
        lookup(ORDER_STATUS_FINANCIAL, &status)
    })
    .unwrap_or_default();

    let order_total = object
        .and_then(|o| parse_amount(o.get("order_total")?))
        .map_or(Decimal::ZERO, |cents| cents / Decimal::ONE_HUNDRED);

    let timestamp =
        extract_timestamp(body, TIMESTAMP_FIELDS).unwrap_or_else(ingestion_timestamp);

    CanonicalEvent {
        shop_id: delivery.shop_id.clone(),
        source_platform: Platform::Woocommerce,
        event_type,
        financial_status,
        order_total,
        timestamp,
        raw_payload: body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delivery(body: serde_json::Value) -> WebhookDelivery {
        WebhookDelivery {
            shop_id: "woo_5c02d2a614d8a9e2d3f1".to_string(),
            platform: Platform::Woocommerce,
            topic: String::new(),
            body,
        }
    }

    #[test]
    fn test_in_band_event_type_is_honored() {
        let event = normalize(&delivery(json!({"event_type": "checkout_started"})));
        assert_eq!(event.event_type, EventType::CheckoutStarted);
        assert_eq!(event.source_platform, Platform::Woocommerce);

        let event = normalize(&delivery(json!({"event_type": "order_failed"})));
        assert_eq!(event.event_type, EventType::OrderFailed);
    }

    #[test]
    fn test_unknown_event_type_defaults_to_order_created() {
        let event = normalize(&delivery(json!({"event_type": "cart_abandoned"})));
        assert_eq!(event.event_type, EventType::OrderCreated);
    }

    #[test]
    fn test_minor_unit_total_scales_to_major_units() {
        let event = normalize(&delivery(json!({"order_total": 9999})));
        assert_eq!(event.order_total, Decimal::new(9999, 2));

        let event = normalize(&delivery(json!({"order_total": "250"})));
        assert_eq!(event.order_total, Decimal::new(250, 2));
    }

    #[test]
    fn test_unresolvable_total_is_zero() {
        for body in [json!({}), json!({"order_total": "n/a"}), json!({"order_total": null})] {
            assert_eq!(normalize(&delivery(body)).order_total, Decimal::ZERO);
        }
    }

    #[test]
    fn test_declared_financial_status_outranks_order_status() {
        let event = normalize(&delivery(json!({
            "financial_status": "failed",
            "status": "completed",
        })));
        assert_eq!(event.financial_status, FinancialStatus::Failed);
    }

    #[test]
    fn test_order_status_table_applies_when_nothing_declared() {
        for (status, expected) in [
            ("completed", FinancialStatus::Paid),
            ("processing", FinancialStatus::Pending),
            ("on-hold", FinancialStatus::Pending),
            ("refunded", FinancialStatus::Failed),
        ] {
            let event = normalize(&delivery(json!({"status": status})));
            assert_eq!(event.financial_status, expected, "status {status}");
        }
    }

    #[test]
    fn test_unknown_status_defaults_to_pending() {
        let event = normalize(&delivery(json!({"status": "checkout-draft"})));
        assert_eq!(event.financial_status, FinancialStatus::Pending);
    }

    #[test]
    fn test_plugin_timestamp_passes_through() {
        let event = normalize(&delivery(json!({
            "timestamp": "2026-01-15T09:30:00+00:00",
            "date_created": "2026-01-14T00:00:00",
        })));
        assert_eq!(event.timestamp, "2026-01-15T09:30:00+00:00");
    }
}
