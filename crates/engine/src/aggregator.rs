//! Run aggregator — per-channel tallies for one run.

use uuid::Uuid;

use herald_common::types::{Channel, DispatchOutcome, OutcomeKind, RunSummary};

/// Accumulates dispatch outcomes into a [`RunSummary`].
pub struct RunAggregator {
    summary: RunSummary,
}

impl RunAggregator {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            summary: RunSummary::empty(run_id),
        }
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        let summary = &mut self.summary;

        match (outcome.kind, &outcome.channel) {
            (OutcomeKind::Sent, Channel::Email) => summary.emails_sent += 1,
            (OutcomeKind::Sent, _) => summary.messages_sent += 1,
            (OutcomeKind::ValidationFailed, _) => summary.validation_failed += 1,
            (OutcomeKind::TransportFailed, _) => summary.transport_failed += 1,
            (OutcomeKind::UnsupportedChannel, _) => summary.unsupported_channel += 1,
        }

        if outcome.kind.is_error() {
            summary.errors += 1;
            tracing::warn!(
                record = outcome.record_index,
                name = %outcome.display_name,
                channel = %outcome.channel,
                outcome = %outcome.kind,
                "Record not delivered"
            );
        } else {
            tracing::debug!(
                record = outcome.record_index,
                name = %outcome.display_name,
                channel = %outcome.channel,
                outcome = %outcome.kind,
                "Record delivered"
            );
        }
    }

    /// Close the run and return its summary.
    pub fn finalize(self) -> RunSummary {
        let summary = self.summary;

        tracing::info!(
            emails_sent = summary.emails_sent,
            messages_sent = summary.messages_sent,
            errors = summary.errors,
            validation_failed = summary.validation_failed,
            transport_failed = summary.transport_failed,
            unsupported_channel = summary.unsupported_channel,
            "Notification run completed"
        );

        summary
    }
}
