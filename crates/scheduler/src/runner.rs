//! Schedule loop that triggers notification runs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use herald_common::config::ScheduleConfig;
use herald_engine::Dispatcher;

use crate::schedule::{RunSchedule, delay_until};

/// Drives the dispatcher on its schedule.
///
/// Runs never overlap: the next fire time is computed only after the previous
/// run has completed.
pub struct Scheduler {
    dispatcher: Arc<Dispatcher>,
    schedule: RunSchedule,
    run_on_start: bool,
    startup_delay: Duration,
}

impl Scheduler {
    pub fn new(dispatcher: Arc<Dispatcher>, schedule: RunSchedule, config: &ScheduleConfig) -> Self {
        Self {
            dispatcher,
            schedule,
            run_on_start: config.run_on_start,
            startup_delay: config.startup_delay,
        }
    }

    /// Run until the task is cancelled, or until the schedule has no future fire time.
    pub async fn run(&self) -> anyhow::Result<()> {
        if self.run_on_start {
            tracing::info!(
                delay_secs = self.startup_delay.as_secs(),
                "Startup run scheduled"
            );
            tokio::time::sleep(self.startup_delay).await;
            self.dispatcher.run_once().await;
        }

        loop {
            let now = Local::now();
            let next = self.schedule.next_after(&now).ok_or_else(|| {
                anyhow::anyhow!("schedule '{}' has no future runs", self.schedule.expr())
            })?;

            tracing::info!(
                next_run = %next.to_rfc3339(),
                schedule = %self.schedule.expr(),
                "Waiting for next scheduled run"
            );
            tokio::time::sleep(delay_until(&next, &now)).await;

            self.dispatcher.run_once().await;
        }
    }
}
