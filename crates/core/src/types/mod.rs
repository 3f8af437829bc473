//! Core types for Cartpulse.
//!
//! The canonical event schema plus the merchant types exchanged with the
//! analytics backend.

pub mod event;
pub mod merchant;

pub use event::{CanonicalEvent, EventType, FinancialStatus, Platform};
pub use merchant::{MerchantSettings, RegisterMerchant, RegistrationAck, SettingsUpdate};
