//! Backend client error types.

use thiserror::Error;

/// Errors that can occur when calling the analytics backend.
///
/// A 404 is not represented here: the settings lookup surfaces it as
/// `Ok(None)`, and the other calls treat it as an empty acknowledgement,
/// matching the backend's upsert semantics.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP request itself failed (connect, DNS, timeout).
    #[error("Backend request failed: {0}")]
    Request(String),

    /// The backend returned a non-2xx, non-404 response.
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The backend returned a 2xx response this client could not parse.
    #[error("Backend response parse error: {0}")]
    Response(String),
}
