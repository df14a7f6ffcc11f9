// Run Loop - repeated scans for the long-running variant

pub mod constants;
mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::scanner::QueueScanner;
use constants::MIN_POLL_INTERVAL;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Runs the scanner on a fixed interval until shut down
///
/// Scans never overlap: the next one starts `interval` after the previous
/// one finished. Shutdown is only honoured between scans.
pub struct RunLoop {
    scanner: Arc<QueueScanner>,
    interval: Duration,
}

impl RunLoop {
    pub fn new(scanner: Arc<QueueScanner>, interval: Duration) -> Self {
        Self {
            scanner,
            interval: interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until shutdown; returns the number of scans started
    pub async fn run(&self, mut shutdown: ShutdownToken) -> usize {
        info!(interval_secs = self.interval.as_secs(), "Run loop started");
        let mut runs = 0;
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            runs += 1;
            if let Err(e) = self.scanner.run().await {
                error!(run = runs, error = %e, "Queue scan failed, retrying next tick");
            }

            tokio::select! {
                _ = sleep(self.interval) => {},
                _ = shutdown.wait() => {
                    info!("Run loop interrupted while idle");
                    break;
                }
            }
        }
        info!(runs, "Run loop stopped");
        runs
    }
}
