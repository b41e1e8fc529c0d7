//! WhatsApp delivery through a WhatsApp Web bridge sidecar.
//!
//! The bridge owns the browser session and exposes a small HTTP API:
//! - `GET  /status`     current session state and pending pairing code
//! - `POST /initialize` (re)start the session
//! - `POST /messages`   send a text message to a chat id

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use herald_common::config::ChatConfig;

use crate::error::NotifierError;
use crate::session::{ChatSession, SessionEvent, SessionState};
use crate::template;
use crate::Transport;

/// Request timeout for every bridge call.
const BRIDGE_TIMEOUT_SECS: u64 = 30;

/// Session status as reported by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeStatus {
    pub state: String,
    pub qr: Option<String>,
}

impl BridgeStatus {
    /// Translate the bridge status into a session event.
    ///
    /// Returns `None` for states that carry no transition (e.g. still starting).
    pub fn to_event(&self) -> Option<SessionEvent> {
        match self.state.as_str() {
            "ready" => Some(SessionEvent::Ready),
            "disconnected" => Some(SessionEvent::Disconnected),
            "qr" => self.qr.clone().map(SessionEvent::QrChallenge),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// HTTP client for the bridge sidecar.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, NotifierError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(BRIDGE_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn status(&self) -> Result<BridgeStatus, NotifierError> {
        let response = self
            .http
            .get(format!("{}/status", self.base_url))
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn initialize(&self) -> Result<(), NotifierError> {
        let response = self
            .http
            .post(format!("{}/initialize", self.base_url))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifierError> {
        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .json(&OutgoingMessage { chat_id, text })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, NotifierError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifierError::Bridge {
            status: status.as_u16(),
            body,
        })
    }
}

/// Build the WhatsApp chat id for a phone number.
///
/// Any non-digit characters (a leading `+`, spaces) are dropped.
pub fn chat_id(phone: &str) -> Result<String, NotifierError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(NotifierError::invalid_address(phone, "no digits in phone number"));
    }
    Ok(format!("{}@c.us", digits))
}

/// Poll the bridge once and fold its status into the session.
///
/// A disconnect triggers re-initialization of the bridge session.
pub async fn poll_session(bridge: &BridgeClient, session: &ChatSession) {
    let event = match bridge.status().await {
        Ok(status) => status.to_event(),
        Err(e) => {
            tracing::debug!(error = %e, "WhatsApp bridge status unavailable");
            session.is_ready().then_some(SessionEvent::Disconnected)
        }
    };

    let Some(event) = event else {
        return;
    };

    if session.handle(event) == SessionState::Disconnected {
        tracing::info!("Reinitializing WhatsApp session");
        session.handle(SessionEvent::Initialize);
        if let Err(e) = bridge.initialize().await {
            tracing::error!(error = %e, "Failed to reinitialize WhatsApp session");
        }
    }
}

/// Start the session and keep it in sync with the bridge until the task is aborted.
pub fn spawn_session_monitor(
    bridge: BridgeClient,
    session: Arc<ChatSession>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Initializing WhatsApp client...");
        session.handle(SessionEvent::Initialize);
        if let Err(e) = bridge.initialize().await {
            tracing::error!(error = %e, "Failed to initialize WhatsApp session");
        }

        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            poll_session(&bridge, &session).await;
        }
    })
}

/// WhatsApp transport adapter.
pub struct WhatsAppTransport {
    bridge: BridgeClient,
    session: Arc<ChatSession>,
}

impl WhatsAppTransport {
    pub fn new(bridge: BridgeClient, session: Arc<ChatSession>) -> Self {
        Self { bridge, session }
    }

    /// Build the transport and, when enabled, start the session monitor.
    ///
    /// With the chat channel disabled the session never leaves
    /// `Uninitialized`, so every send fails as not ready.
    pub fn from_config(
        config: &ChatConfig,
    ) -> Result<(Self, Option<JoinHandle<()>>), NotifierError> {
        let bridge = BridgeClient::new(&config.bridge_url)?;
        let session = Arc::new(ChatSession::new());

        let monitor = if config.enabled {
            Some(spawn_session_monitor(
                bridge.clone(),
                session.clone(),
                config.status_poll_interval,
            ))
        } else {
            tracing::warn!("WhatsApp channel disabled; chat sends will fail");
            None
        };

        Ok((Self::new(bridge, session), monitor))
    }

    async fn try_send(
        &self,
        target: &str,
        display_name: &str,
        payload: &serde_json::Value,
    ) -> Result<(), NotifierError> {
        if !self.session.is_ready() {
            return Err(NotifierError::SessionNotReady(
                self.session.state().to_string(),
            ));
        }

        let chat_id = chat_id(target)?;
        let text = template::chat_text(display_name, payload);
        self.bridge.send_message(&chat_id, &text).await
    }
}

#[async_trait]
impl Transport for WhatsAppTransport {
    async fn send(&self, target: &str, display_name: &str, payload: &serde_json::Value) -> bool {
        match self.try_send(target, display_name, payload).await {
            Ok(()) => {
                tracing::info!(phone = %target, "WhatsApp message sent");
                true
            }
            Err(e) => {
                tracing::error!(
                    phone = %target,
                    error = %e,
                    "Failed to send WhatsApp message"
                );
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "whatsapp"
    }
}
