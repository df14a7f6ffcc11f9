//! Walk-in Queue Notifier - Main Entry Point
//! One-shot scan by default, polling loop when an interval is configured

mod config;

use anyhow::{Context, Result};
use config::{ensure_db_dir, LogFormat, MessagingConfig, NotifierConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use walkin_core::application::{shutdown_channel, QueueScanner, RunLoop};
use walkin_core::port::{MessageSender, QueueStore};
use walkin_infra_sms::{DryRunMessageSender, TwilioMessageSender};
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long a scan in progress may take to finish after Ctrl+C
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging(LogFormat::from_env())?;

    info!("Walk-in notifier v{} starting...", VERSION);

    // 2. Load configuration
    let config = NotifierConfig::from_env().context("Invalid configuration")?;

    info!(db_path = %config.db_path, "Initializing database...");

    // 3. Initialize database
    ensure_db_dir(&config.db_path).with_context(|| {
        format!("Failed to create database directory for {}", config.db_path)
    })?;
    let pool = create_pool(&config.db_path)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let store: Arc<dyn QueueStore> = Arc::new(SqliteQueueStore::new(pool));
    let sender: Arc<dyn MessageSender> = match &config.messaging {
        MessagingConfig::DryRun => {
            info!("Dry-run mode: messages are logged, not sent");
            Arc::new(DryRunMessageSender::new())
        }
        MessagingConfig::Twilio(twilio) => {
            info!(account_sid = %twilio.account_sid, "Using Twilio sender");
            let twilio_sender =
                TwilioMessageSender::new(twilio.clone()).context("SMS sender setup failed")?;
            Arc::new(twilio_sender)
        }
    };
    let scanner = Arc::new(QueueScanner::new(store, sender));

    // 5. Run
    match config.poll_interval {
        None => {
            let report = scanner.run().await.context("Queue scan aborted")?;
            info!(
                candidates = report.candidates,
                notified = report.notified,
                "Run complete"
            );
        }
        Some(interval) => {
            let run_loop = RunLoop::new(scanner, interval);
            let (shutdown_tx, shutdown_rx) = shutdown_channel();

            let loop_handle = tokio::spawn(async move { run_loop.run(shutdown_rx).await });

            info!("Polling every {}s. Press Ctrl+C to shutdown", interval.as_secs());
            tokio::signal::ctrl_c().await?;

            info!("Shutdown signal received. Finishing current scan...");
            shutdown_tx.shutdown();
            match tokio::time::timeout(SHUTDOWN_GRACE, loop_handle).await {
                Ok(Ok(runs)) => info!(runs, "Run loop finished"),
                Ok(Err(e)) => error!(error = ?e, "Run loop task failed"),
                Err(_) => error!("Scan did not finish within shutdown grace period"),
            }
        }
    }

    info!("Shutdown complete.");
    Ok(())
}

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("walkin=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}
