//! Next-run computation for the notification schedule.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeZone};
use cron::Schedule;

use herald_common::error::AppError;

/// Cron-based trigger for notification runs.
#[derive(Debug, Clone)]
pub struct RunSchedule {
    expr: String,
    schedule: Schedule,
}

impl RunSchedule {
    /// Parse a cron expression.
    ///
    /// Accepts the `cron` crate's 6/7-field form as well as the common 5-field
    /// form (min hour dom month dow), which is padded with a leading `0`
    /// seconds field and a trailing `*` year field.
    ///
    /// Numeric day-of-week values follow the `cron` crate, not crontab:
    /// `1` is Sunday and `7` is Saturday, and `0` is rejected. Day names
    /// (`Mon-Fri`) mean the same thing in both and are preferred.
    pub fn parse(expr: &str) -> Result<Self, AppError> {
        let expr = expr.trim();
        let schedule = Schedule::from_str(expr)
            .or_else(|_| Schedule::from_str(&format!("0 {expr} *")))
            .map_err(|e| AppError::Schedule(format!("invalid cron expression '{expr}': {e}")))?;

        Ok(Self {
            expr: expr.to_string(),
            schedule,
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// First fire time strictly after `after`.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(after).next()
    }
}

/// Time left until `next`, or zero when it is already due.
pub fn delay_until<Tz: TimeZone>(next: &DateTime<Tz>, now: &DateTime<Tz>) -> Duration {
    next.clone()
        .signed_duration_since(now.clone())
        .to_std()
        .unwrap_or(Duration::ZERO)
}
