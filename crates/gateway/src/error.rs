//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures upstream failures to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::platform::PlatformError;
use crate::provisioning::ProvisionError;

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// Webhook signature missing or invalid.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Analytics backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Platform (Shopify) call failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Merchant provisioning failed.
    #[error("Provisioning error: {0}")]
    Provision(#[from] ProvisionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture upstream failures to Sentry; rejected webhooks and bad
        // requests are normal traffic
        if matches!(
            self,
            Self::Backend(_) | Self::Platform(_) | Self::Provision(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            // An OAuth callback the platform cannot authenticate is the
            // caller's fault, not an upstream outage
            Self::Platform(PlatformError::InvalidCallback(_) | PlatformError::InvalidShop(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Backend(_) | Self::Platform(_) | Self::Provision(_) => StatusCode::BAD_GATEWAY,
        };

        // Don't expose upstream error details to clients
        let message = match &self {
            Self::Backend(_) | Self::Provision(_) => "Upstream service error".to_string(),
            Self::Platform(err) => match err {
                PlatformError::InvalidCallback(_) | PlatformError::InvalidShop(_) => {
                    self.to_string()
                }
                _ => "Upstream service error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
