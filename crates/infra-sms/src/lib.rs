// Walkin Infrastructure - SMS Adapters
// Implements: MessageSender

pub mod dry_run;
pub mod twilio;

pub use dry_run::DryRunMessageSender;
pub use twilio::{TwilioConfig, TwilioMessageSender, DEFAULT_TWILIO_API_BASE};
