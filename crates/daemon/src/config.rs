//! Notifier configuration, read from the environment once at startup
//!
//! | variable | default |
//! |---|---|
//! | `WALKIN_DB_PATH` | `~/.walkin/queue.db` |
//! | `WALKIN_LOG_FORMAT` | `pretty` (`json` for structured output) |
//! | `WALKIN_POLL_INTERVAL_SECS` | unset: scan once and exit |
//! | `WALKIN_DRY_RUN` | `false` |
//! | `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER` | required unless dry-run |
//! | `TWILIO_API_BASE` | `https://api.twilio.com` |

use std::path::Path;
use std::time::Duration;
use walkin_core::error::{AppError, Result};
use walkin_infra_sms::{TwilioConfig, DEFAULT_TWILIO_API_BASE};

const DEFAULT_DB_PATH: &str = "~/.walkin/queue.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("WALKIN_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where alerts go
#[derive(Debug, Clone)]
pub enum MessagingConfig {
    DryRun,
    Twilio(TwilioConfig),
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub db_path: String,
    /// `None` runs a single scan
    pub poll_interval: Option<Duration>,
    pub messaging: MessagingConfig,
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get("WALKIN_DB_PATH")
            .map(|p| shellexpand::tilde(&p).into_owned())
            .unwrap_or_else(|| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

        let poll_interval = match get("WALKIN_POLL_INTERVAL_SECS") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::Config(format!(
                        "WALKIN_POLL_INTERVAL_SECS must be a whole number of seconds, got {:?}",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        let dry_run = match get("WALKIN_DRY_RUN").as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "WALKIN_DRY_RUN must be true/false/1/0, got {:?}",
                    other
                )))
            }
        };

        let messaging = if dry_run {
            MessagingConfig::DryRun
        } else {
            let require = |key: &str| {
                get(key).ok_or_else(|| AppError::Config(format!("{} is not set", key)))
            };
            MessagingConfig::Twilio(TwilioConfig {
                account_sid: require("TWILIO_ACCOUNT_SID")?,
                auth_token: require("TWILIO_AUTH_TOKEN")?,
                from_number: require("TWILIO_PHONE_NUMBER")?,
                api_base: get("TWILIO_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
            })
        };

        Ok(Self {
            db_path,
            poll_interval,
            messaging,
        })
    }
}

/// Create the directory holding the database file. In-memory databases
/// have none.
pub fn ensure_db_dir(db_path: &str) -> std::io::Result<()> {
    if db_path.contains(":memory:") {
        return Ok(());
    }
    let file = db_path
        .strip_prefix("sqlite://")
        .or_else(|| db_path.strip_prefix("sqlite:"))
        .unwrap_or(db_path);
    match Path::new(file).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
