// Message Sender Port
// Abstraction over the outbound SMS channel

use async_trait::async_trait;
use thiserror::Error;

/// Provider-assigned message identifier
pub type MessageId = String;

/// Send errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Provider rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Message Sender trait
///
/// Implementations:
/// - TwilioMessageSender: Twilio Messages REST API
/// - DryRunMessageSender: logs instead of sending
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message and return the provider's message id
    ///
    /// # Errors
    /// - SendError::InvalidRecipient if the number is unusable
    /// - SendError::Rejected if the provider refuses the request
    /// - SendError::Transport if the provider cannot be reached
    async fn send_message(&self, to: &str, body: &str) -> Result<MessageId, SendError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// A message captured by the mock
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMessage {
        pub to: String,
        pub body: String,
    }

    /// Mock sender behavior
    #[derive(Debug, Clone)]
    pub enum MockSendBehavior {
        /// Always succeed
        Success,
        /// Always fail with this error
        Fail(SendError),
    }

    /// Recording Message Sender for testing
    ///
    /// Every attempt is recorded, including failed ones.
    pub struct RecordingMessageSender {
        behavior: Mutex<MockSendBehavior>,
        attempts: Mutex<Vec<SentMessage>>,
    }

    impl RecordingMessageSender {
        pub fn new(behavior: MockSendBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                attempts: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockSendBehavior::Success)
        }

        pub fn new_fail(error: SendError) -> Self {
            Self::new(MockSendBehavior::Fail(error))
        }

        pub fn set_behavior(&self, behavior: MockSendBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn attempts(&self) -> Vec<SentMessage> {
            self.attempts.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.attempts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MessageSender for RecordingMessageSender {
        async fn send_message(&self, to: &str, body: &str) -> Result<MessageId, SendError> {
            let n = {
                let mut attempts = self.attempts.lock().unwrap();
                attempts.push(SentMessage {
                    to: to.to_string(),
                    body: body.to_string(),
                });
                attempts.len()
            };

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockSendBehavior::Success => Ok(format!("SM{:032}", n)),
                MockSendBehavior::Fail(err) => Err(err),
            }
        }
    }
}
