// Notification Dispatcher - send the alert, then record it

use crate::domain::QueueEntry;
use crate::port::{MessageId, MessageSender, QueueStore, SendError};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Alert text sent to a customer whose turn is coming up
pub fn render_message(customer_name: &str) -> String {
    format!(
        "Hi {}, you're up next! Please return to the barbershop.",
        customer_name
    )
}

/// Phone number with all but the last four digits hidden, for logs
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(digits.len() - 4), tail)
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent and recorded
    Notified { message_id: MessageId },
    /// Send failed; the entry stays unnotified for the next run
    SendFailed(SendError),
    /// Sent but the flag write failed; the next run may alert again
    RecordFailed { message_id: MessageId, error: String },
}

/// Sends alerts and flips the `notified` flag
///
/// The flag is written only after a successful send. Nothing is retried
/// within a run.
pub struct NotificationDispatcher {
    store: Arc<dyn QueueStore>,
    sender: Arc<dyn MessageSender>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn QueueStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self { store, sender }
    }

    pub async fn dispatch(&self, entry: &QueueEntry, phone: &str) -> DispatchOutcome {
        let body = render_message(&entry.customer_name);

        let message_id = match self.sender.send_message(phone, &body).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    entry_id = %entry.id,
                    to = %mask_phone(phone),
                    error = %e,
                    "SMS send failed, entry left for next run"
                );
                return DispatchOutcome::SendFailed(e);
            }
        };

        info!(
            entry_id = %entry.id,
            to = %mask_phone(phone),
            message_id = %message_id,
            "SMS sent"
        );

        match self.store.set_notified(&entry.id).await {
            Ok(()) => {
                info!(entry_id = %entry.id, customer = %entry.customer_name, "Marked as notified");
                DispatchOutcome::Notified { message_id }
            }
            Err(e) => {
                error!(
                    entry_id = %entry.id,
                    message_id = %message_id,
                    error = %e,
                    "SMS sent but notified flag not saved; customer may be alerted again"
                );
                DispatchOutcome::RecordFailed {
                    message_id,
                    error: e.to_string(),
                }
            }
        }
    }
}
