// Run loop constants
use std::time::Duration;

/// Shortest allowed gap between two scans (5s)
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);
