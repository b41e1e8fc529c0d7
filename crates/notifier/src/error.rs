use thiserror::Error;

/// Errors raised inside a transport before they are folded into a boolean.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bridge rejected request with status {status}: {body}")]
    Bridge { status: u16, body: String },

    #[error("chat session is not ready (state: {0})")]
    SessionNotReady(String),
}

impl NotifierError {
    pub fn invalid_address(address: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.to_string(),
        }
    }
}
