// Port Layer - Interfaces for external dependencies

pub mod message_sender;
pub mod queue_store;

// Re-exports
pub use message_sender::{MessageId, MessageSender, SendError};
pub use queue_store::{CandidateFilter, QueueScope, QueueStore};
