//! Herald binary entrypoint: wires the transports, the record source and the
//! dispatcher together and hands them to the scheduler.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use herald_common::config::AppConfig;
use herald_engine::{Dispatcher, FixedDelay, PacingPolicy};
use herald_notifier::{EmailTransport, WhatsAppTransport};
use herald_source::WorkbookSource;

use herald_scheduler::runner::Scheduler;
use herald_scheduler::schedule::RunSchedule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "herald=info,herald_scheduler=info,herald_engine=info,herald_notifier=info,herald_source=info",
            )
        }))
        .json()
        .init();

    tracing::info!("Monthly notification system starting...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let schedule = RunSchedule::parse(&config.schedule.cron)?;

    // Chat session: pairing happens in the background, sends fail until ready
    let (whatsapp, session_monitor) = WhatsAppTransport::from_config(&config.chat)?;

    // SMTP pool: verification failure is logged, sends are still attempted
    let email = EmailTransport::new(&config.email)?;
    email.verify().await;

    let source = WorkbookSource::from_config(&config.source);

    let dispatcher = Dispatcher::new(
        Arc::new(source),
        Arc::new(email),
        Arc::new(whatsapp),
        Arc::new(FixedDelay::new(config.dispatch.pacing_delay)),
    )
    .with_policy(PacingPolicy::from_config(&config.dispatch));

    let scheduler = Scheduler::new(Arc::new(dispatcher), schedule, &config.schedule);

    tracing::info!(
        schedule = %config.schedule.cron,
        run_on_start = config.schedule.run_on_start,
        "Scheduling complete, waiting for the next monthly run..."
    );

    // Run with graceful shutdown on Ctrl+C
    let result = tokio::select! {
        result = scheduler.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
            Ok(())
        }
    };

    if let Some(monitor) = session_monitor {
        monitor.abort();
    }

    if let Err(e) = &result {
        tracing::error!(error = %e, "Scheduler exited with error");
    }

    tracing::info!("Monthly notification system stopped.");
    result
}
