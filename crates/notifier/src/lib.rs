//! Delivery transports.
//!
//! Every transport wraps one delivery mechanism behind the [`Transport`]
//! contract: a send either succeeds or fails, and failures never escape as
//! errors. Session objects (the SMTP pool, the WhatsApp bridge session) are
//! built once at startup and shared by reference for the life of the process.

pub mod email;
pub mod error;
pub mod session;
pub mod template;
pub mod whatsapp;

use async_trait::async_trait;

pub use email::EmailTransport;
pub use error::NotifierError;
pub use session::{ChatSession, SessionEvent, SessionState};
pub use whatsapp::WhatsAppTransport;

/// Trait that every delivery transport must implement.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `payload` to `target`, addressing the recipient as `display_name`.
    ///
    /// Returns `true` when the underlying transport accepted the message.
    /// Implementations log and absorb all transport errors.
    async fn send(&self, target: &str, display_name: &str, payload: &serde_json::Value) -> bool;

    /// Human-readable name for this transport (e.g., "smtp").
    fn name(&self) -> &'static str;
}
