//! Pacing controller — fixed delay between consecutive sends.
//!
//! Transports rate-limit bursts of outbound messages, so the dispatch loop
//! waits a fixed duration after each record before moving to the next one.
//! This is the only intentional suspension point of a run.

use std::time::Duration;

use async_trait::async_trait;

use herald_common::config::DispatchConfig;
use herald_common::types::OutcomeKind;

/// Default delay between sends in seconds (5 minutes).
pub const DEFAULT_PACING_SECONDS: u64 = 300;

/// Suspends the dispatch loop between records.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self);
}

/// Pacer that sleeps for a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PACING_SECONDS))
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        tracing::debug!(delay_secs = self.delay.as_secs(), "Pausing before next send");
        tokio::time::sleep(self.delay).await;
    }
}

/// Which outcomes are followed by a pacing wait.
///
/// Sent and TransportFailed outcomes always are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub after_validation_failure: bool,
    pub after_unsupported: bool,
}

impl PacingPolicy {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            after_validation_failure: config.pace_after_validation_failure,
            after_unsupported: config.pace_after_unsupported,
        }
    }

    pub fn applies_to(&self, kind: OutcomeKind) -> bool {
        match kind {
            OutcomeKind::Sent | OutcomeKind::TransportFailed => true,
            OutcomeKind::ValidationFailed => self.after_validation_failure,
            OutcomeKind::UnsupportedChannel => self.after_unsupported,
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            after_validation_failure: true,
            after_unsupported: false,
        }
    }
}
