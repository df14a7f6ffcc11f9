// Dry-run sender: logs instead of sending

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use walkin_core::application::dispatcher::mask_phone;
use walkin_core::port::{MessageId, MessageSender, SendError};

/// Accepts every message and only logs it
///
/// Used when the notifier runs without SMS credentials (local runs,
/// staging). Entries still get marked as notified.
#[derive(Default)]
pub struct DryRunMessageSender {
    sent: AtomicU64,
}

impl DryRunMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessageSender for DryRunMessageSender {
    async fn send_message(&self, to: &str, body: &str) -> Result<MessageId, SendError> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            to = %mask_phone(to),
            body_len = body.chars().count(),
            "[dry-run] SMS not sent"
        );
        Ok(format!("dry-run-{}", n))
    }
}
