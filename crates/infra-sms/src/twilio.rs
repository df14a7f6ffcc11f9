// Twilio Messages API adapter

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use walkin_core::error::{AppError, Result};
use walkin_core::port::{MessageId, MessageSender, SendError};

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Per-request timeout for the Messages API
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Twilio credentials and sender number
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Number messages are sent from
    pub from_number: String,
    pub api_base: String,
}

// Keep the auth token out of logs
impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Successful create-message response (only the fields used)
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: Option<String>,
}

/// Sends SMS through the Twilio Messages REST API
pub struct TwilioMessageSender {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioMessageSender {
    pub fn new(config: TwilioConfig) -> Result<Self> {
        for (name, value) in [
            ("account SID", &config.account_sid),
            ("auth token", &config.auth_token),
            ("sender number", &config.from_number),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("Twilio {} is empty", name)));
            }
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl MessageSender for TwilioMessageSender {
    async fn send_message(&self, to: &str, body: &str) -> std::result::Result<MessageId, SendError> {
        let to = to.trim();
        if !to.chars().any(|c| c.is_ascii_digit()) {
            return Err(SendError::InvalidRecipient(to.to_string()));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", self.config.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let api_error = response.json::<ApiError>().await.ok();
            let message = match api_error {
                Some(ApiError {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{} (code {})", message, code),
                Some(ApiError {
                    message: Some(message),
                    ..
                }) => message,
                _ => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(SendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| SendError::Transport(format!("Invalid response body: {}", e)))?;

        debug!(message_id = %resource.sid, "Twilio accepted message");
        Ok(resource.sid)
    }
}
