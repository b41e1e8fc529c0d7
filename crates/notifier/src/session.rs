//! Chat session lifecycle.
//!
//! The WhatsApp bridge reports its progress as events (pairing challenge,
//! ready, disconnected). This module folds those events into a small state
//! machine and exposes only `is_ready()` to the rest of the system.
//!
//! ```text
//! Uninitialized ─Initialize─▶ Initializing ─QrChallenge─▶ AwaitingPairing
//!                                  │                           │
//!                                  └────────Ready──────────────┴──▶ Ready
//!                                                                    │
//!                     Initializing ◀─Initialize─ Disconnected ◀──────┘
//! ```

use tokio::sync::watch;

/// Lifecycle state of the chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    /// Waiting for the pairing code to be scanned on the phone.
    AwaitingPairing { qr: String },
    Ready,
    Disconnected,
}

/// Events reported by the chat bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Initialize,
    QrChallenge(String),
    Ready,
    Disconnected,
}

impl SessionState {
    /// Compute the state that follows `event`.
    ///
    /// Bridge events are ignored until the session has been initialized, and
    /// `Initialize` is ignored while a session is already live.
    pub fn apply(&self, event: &SessionEvent) -> SessionState {
        match (self, event) {
            (SessionState::Uninitialized | SessionState::Disconnected, SessionEvent::Initialize) => {
                SessionState::Initializing
            }
            (_, SessionEvent::Initialize) => self.clone(),
            (SessionState::Uninitialized, _) => SessionState::Uninitialized,
            (_, SessionEvent::QrChallenge(qr)) => SessionState::AwaitingPairing { qr: qr.clone() },
            (_, SessionEvent::Ready) => SessionState::Ready,
            (_, SessionEvent::Disconnected) => SessionState::Disconnected,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::AwaitingPairing { .. } => write!(f, "awaiting_pairing"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Shared handle to the chat session state.
///
/// Written by the session monitor task, read by the transport.
pub struct ChatSession {
    state: watch::Sender<SessionState>,
}

impl ChatSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self { state }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Ready)
    }

    /// Apply a bridge event and return the resulting state.
    pub fn handle(&self, event: SessionEvent) -> SessionState {
        let mut transition = None;

        self.state.send_if_modified(|current| {
            let next = current.apply(&event);
            if next == *current {
                return false;
            }
            transition = Some((current.clone(), next.clone()));
            *current = next;
            true
        });

        if let Some((from, to)) = transition {
            match &to {
                SessionState::AwaitingPairing { qr } => {
                    tracing::info!(
                        qr = %qr,
                        "Scan this pairing code with WhatsApp on your phone"
                    );
                }
                SessionState::Ready => tracing::info!("WhatsApp client connected and ready"),
                SessionState::Disconnected => tracing::warn!("WhatsApp client disconnected"),
                _ => {}
            }
            tracing::debug!(from = %from, to = %to, "Chat session transition");
        }

        self.state()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
