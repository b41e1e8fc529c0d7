//! Dispatch loop.
//!
//! For every record of the source, in order:
//! 1. Route it to a channel (via `ChannelRouter`)
//! 2. Reject unsupported channels
//! 3. Check the channel's required field (via `RecordValidator`)
//! 4. Hand it to the channel's transport
//! 5. Pace before the next record (via `Pacer` + `PacingPolicy`)
//!
//! Each record ends in exactly one outcome. Nothing a single record does can
//! abort the batch; only an empty or unavailable source ends a run early.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use herald_common::types::{Channel, DispatchOutcome, OutcomeKind, RecipientRecord, RunSummary};
use herald_notifier::Transport;
use herald_source::RecordSource;

use crate::aggregator::RunAggregator;
use crate::pacing::{Pacer, PacingPolicy};
use crate::router::ChannelRouter;
use crate::validator::RecordValidator;

/// Orchestrates one notification run over the full record set.
pub struct Dispatcher {
    source: Arc<dyn RecordSource>,
    email: Arc<dyn Transport>,
    chat: Arc<dyn Transport>,
    pacer: Arc<dyn Pacer>,
    policy: PacingPolicy,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn RecordSource>,
        email: Arc<dyn Transport>,
        chat: Arc<dyn Transport>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            source,
            email,
            chat,
            pacer,
            policy: PacingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PacingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one full pass over the record source.
    pub async fn run_once(&self) -> RunSummary {
        let run_id = Uuid::new_v4();
        self.run(run_id)
            .instrument(tracing::info_span!("run", run_id = %run_id))
            .await
    }

    async fn run(&self, run_id: Uuid) -> RunSummary {
        tracing::info!(source = %self.source.describe(), "Starting monthly notification run");

        let records = match self.source.load().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read recipient records");
                Vec::new()
            }
        };

        if records.is_empty() {
            tracing::error!("No recipients found or source unavailable, aborting run");
            return RunSummary::empty(run_id);
        }

        tracing::info!(records = records.len(), "Dispatching notifications");

        let mut aggregator = RunAggregator::new(run_id);
        let last = records.len() - 1;

        for (index, record) in records.iter().enumerate() {
            let outcome = self.dispatch_record(index, record).await;
            let pace = index < last && self.policy.applies_to(outcome.kind);

            aggregator.record(&outcome);

            if pace {
                self.pacer.wait().await;
            }
        }

        aggregator.finalize()
    }

    /// Process a single record through routing, validation and delivery.
    pub async fn dispatch_record(&self, index: usize, record: &RecipientRecord) -> DispatchOutcome {
        let channel = ChannelRouter::route(record);
        let display_name = record.name().to_string();

        let kind = match self.transport_for(&channel) {
            None => {
                tracing::error!(
                    record = index,
                    name = %display_name,
                    channel = %channel,
                    "Unsupported channel"
                );
                OutcomeKind::UnsupportedChannel
            }
            Some(transport) => match RecordValidator::target(record, &channel) {
                None => {
                    tracing::error!(
                        record = index,
                        name = %display_name,
                        channel = %channel,
                        "Recipient is missing the address required by its channel"
                    );
                    OutcomeKind::ValidationFailed
                }
                Some(target) => {
                    tracing::debug!(
                        record = index,
                        name = %display_name,
                        transport = transport.name(),
                        "Sending notification"
                    );
                    let payload = record.payload_or_default();
                    if transport.send(target, &display_name, &payload).await {
                        OutcomeKind::Sent
                    } else {
                        OutcomeKind::TransportFailed
                    }
                }
            },
        };

        DispatchOutcome {
            record_index: index,
            display_name,
            channel,
            kind,
        }
    }

    fn transport_for(&self, channel: &Channel) -> Option<&Arc<dyn Transport>> {
        match channel {
            Channel::Email => Some(&self.email),
            Channel::Chat => Some(&self.chat),
            Channel::Unsupported(_) => None,
        }
    }
}
