//! Backend client integration tests against a mock HTTP server.

use httpmock::prelude::*;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;

use cartpulse_core::{
    CanonicalEvent, EventType, FinancialStatus, Platform, RegisterMerchant, SettingsUpdate,
};
use cartpulse_gateway::backend::{BackendClient, BackendError};
use cartpulse_gateway::config::BackendConfig;

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        base_url: server.base_url(),
        api_key: SecretString::from("backend_api_key"),
    })
}

fn sample_event() -> CanonicalEvent {
    CanonicalEvent {
        shop_id: "test-shop.myshopify.com".to_string(),
        source_platform: Platform::Shopify,
        event_type: EventType::OrderCreated,
        financial_status: FinancialStatus::Paid,
        order_total: Decimal::new(9999, 2),
        timestamp: "2025-12-04T00:00:00Z".to_string(),
        raw_payload: json!({"total_price": "99.99"}),
    }
}

#[tokio::test]
async fn test_get_settings_surfaces_404_as_absence() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/merchants/settings")
            .query_param("shop_id", "unknown-shop");
        then.status(404).body("not found");
    });

    let settings = client_for(&server)
        .get_settings("unknown-shop")
        .await
        .expect("404 is not an error");

    assert!(settings.is_none());
}

#[tokio::test]
async fn test_get_settings_parses_known_shop() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/merchants/settings")
            .query_param("shop_id", "woo_abc123")
            .header("authorization", "Bearer backend_api_key");
        then.status(200).json_body(json!({
            "shop_id": "woo_abc123",
            "email": "owner@example.com",
            "alerts_enabled": true,
        }));
    });

    let settings = client_for(&server)
        .get_settings("woo_abc123")
        .await
        .expect("request succeeds")
        .expect("settings exist");

    assert_eq!(settings.shop_id.as_deref(), Some("woo_abc123"));
    assert_eq!(settings.email.as_deref(), Some("owner@example.com"));
    assert_eq!(settings.alerts_enabled, Some(true));
}

#[tokio::test]
async fn test_get_settings_encodes_shop_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/merchants/settings")
            .query_param("shop_id", "shop with spaces");
        then.status(200).json_body(json!({}));
    });

    client_for(&server)
        .get_settings("shop with spaces")
        .await
        .expect("request succeeds");

    mock.assert();
}

#[tokio::test]
async fn test_register_merchant_sends_bearer_auth_and_returns_ack() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/merchants/register")
            .header("authorization", "Bearer backend_api_key")
            .json_body(json!({
                "shop_id": "woo_abc123",
                "platform": "woocommerce",
                "email": "owner@example.com",
                "webhook_url": "https://mirror.example.com/hook",
                "alerts_enabled": true,
            }));
        then.status(200).json_body(json!({"api_key": "issued-key"}));
    });

    let ack = client_for(&server)
        .register_merchant(&RegisterMerchant {
            shop_id: "woo_abc123".to_string(),
            platform: Platform::Woocommerce,
            email: "owner@example.com".to_string(),
            webhook_url: Some("https://mirror.example.com/hook".to_string()),
            alerts_enabled: true,
        })
        .await
        .expect("request succeeds");

    mock.assert();
    assert_eq!(ack.and_then(|a| a.api_key).as_deref(), Some("issued-key"));
}

#[tokio::test]
async fn test_non_2xx_non_404_propagates_status_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/merchants/register");
        then.status(500).body("merchant store exploded");
    });

    let result = client_for(&server)
        .register_merchant(&RegisterMerchant {
            shop_id: "shop".to_string(),
            platform: Platform::Shopify,
            email: "owner@example.com".to_string(),
            webhook_url: None,
            alerts_enabled: true,
        })
        .await;

    match result {
        Err(BackendError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "merchant store exploded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_settings_patches_and_parses_response() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::PATCH)
            .path("/api/merchants/settings")
            .json_body(json!({
                "shop_id": "woo_abc123",
                "email": "new@example.com",
                "alerts_enabled": false,
            }));
        then.status(200).json_body(json!({
            "shop_id": "woo_abc123",
            "email": "new@example.com",
            "alerts_enabled": false,
        }));
    });

    let settings = client_for(&server)
        .update_settings(&SettingsUpdate {
            shop_id: "woo_abc123".to_string(),
            email: "new@example.com".to_string(),
            webhook_url: None,
            alerts_enabled: false,
        })
        .await
        .expect("request succeeds");

    mock.assert();
    assert_eq!(
        settings.and_then(|s| s.email).as_deref(),
        Some("new@example.com")
    );
}

#[tokio::test]
async fn test_empty_2xx_body_is_an_empty_ack() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::PATCH).path("/api/merchants/settings");
        then.status(204);
    });

    let settings = client_for(&server)
        .update_settings(&SettingsUpdate {
            shop_id: "shop".to_string(),
            email: "owner@example.com".to_string(),
            webhook_url: None,
            alerts_enabled: true,
        })
        .await
        .expect("request succeeds");

    assert!(settings.is_none());
}

#[tokio::test]
async fn test_forward_event_posts_canonical_event() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/events")
            .header("authorization", "Bearer backend_api_key")
            .json_body_includes(
                r#"{
                    "shop_id": "test-shop.myshopify.com",
                    "source_platform": "shopify",
                    "event_type": "order_created",
                    "financial_status": "paid",
                    "order_total": 99.99
                }"#,
            );
        then.status(202).json_body(json!({"accepted": true}));
    });

    client_for(&server)
        .forward_event(&sample_event())
        .await
        .expect("forward succeeds");

    mock.assert();
}

#[tokio::test]
async fn test_forward_event_propagates_rejection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/events");
        then.status(429).body("slow down");
    });

    let result = client_for(&server).forward_event(&sample_event()).await;
    assert!(matches!(
        result,
        Err(BackendError::Api { status: 429, .. })
    ));
}

#[tokio::test]
async fn test_notify_deactivated_posts_shop_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/merchants/deactivate")
            .json_body(json!({"shop_id": "woo_abc123"}));
        then.status(200).json_body(json!({"ok": true}));
    });

    client_for(&server)
        .notify_deactivated("woo_abc123")
        .await
        .expect("notification succeeds");

    mock.assert();
}

#[tokio::test]
async fn test_unreachable_backend_is_a_request_error() {
    // Nothing listens on this port
    let client = BackendClient::new(&BackendConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: SecretString::from("backend_api_key"),
    });

    let result = client.forward_event(&sample_event()).await;
    assert!(matches!(result, Err(BackendError::Request(_))));
}
