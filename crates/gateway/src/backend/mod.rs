//! Analytics backend client.
//!
//! A typed `reqwest` client for the downstream analytics service. All calls
//! are single HTTP round-trips with no internal retry; retry policy belongs
//! to whoever invokes them (for webhook ingestion that is the platform's
//! own redelivery mechanism).

mod client;
mod error;

pub use client::BackendClient;
pub use error::BackendError;
