use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name used in greetings when a record carries no display name.
pub const DEFAULT_DISPLAY_NAME: &str = "Customer";

/// Text embedded in the message when a record carries no payload.
pub const DEFAULT_PAYLOAD: &str = "No data available";

/// Delivery channel selected for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Chat,
    /// A declared tag that matches no known channel (normalized, lowercase).
    Unsupported(String),
}

impl Channel {
    /// Resolve a declared channel tag.
    ///
    /// Missing or blank tags fall back to [`Channel::Email`]. Matching is
    /// case-insensitive and ignores surrounding whitespace.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let normalized = match tag.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return Channel::Email,
        };

        match normalized.as_str() {
            "email" => Channel::Email,
            "whatsapp" | "chat" => Channel::Chat,
            _ => Channel::Unsupported(normalized),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Channel::Unsupported(_))
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Chat => write!(f, "whatsapp"),
            Channel::Unsupported(tag) => write!(f, "{}", tag),
        }
    }
}

/// One recipient row read from the record source.
///
/// All fields are optional at this level; which ones are required depends on
/// the channel the record is routed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipientRecord {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    /// International format, digits only (e.g. `391234567890`).
    pub phone_number: Option<String>,
    pub payload: Option<serde_json::Value>,
    /// Declared channel tag as found in the source, before routing.
    pub channel: Option<String>,
}

impl RecipientRecord {
    /// Display name, or the placeholder when absent or blank.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// Payload, or the placeholder text when absent or null.
    pub fn payload_or_default(&self) -> serde_json::Value {
        match &self.payload {
            Some(serde_json::Value::Null) | None => {
                serde_json::Value::String(DEFAULT_PAYLOAD.to_string())
            }
            Some(value) => value.clone(),
        }
    }
}

/// Terminal classification of one record within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Sent,
    ValidationFailed,
    TransportFailed,
    UnsupportedChannel,
}

impl OutcomeKind {
    pub fn is_error(&self) -> bool {
        !matches!(self, OutcomeKind::Sent)
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Sent => write!(f, "sent"),
            OutcomeKind::ValidationFailed => write!(f, "validation_failed"),
            OutcomeKind::TransportFailed => write!(f, "transport_failed"),
            OutcomeKind::UnsupportedChannel => write!(f, "unsupported_channel"),
        }
    }
}

/// Result of processing a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Position of the record in source order.
    pub record_index: usize,
    pub display_name: String,
    pub channel: Channel,
    pub kind: OutcomeKind,
}

/// Aggregate report of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub emails_sent: u64,
    pub messages_sent: u64,
    pub errors: u64,
    pub validation_failed: u64,
    pub transport_failed: u64,
    pub unsupported_channel: u64,
}

impl RunSummary {
    pub fn empty(run_id: Uuid) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    /// Number of records accounted for by this summary.
    pub fn total(&self) -> u64 {
        self.emails_sent + self.messages_sent + self.errors
    }
}
