// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown entry status: {0}")]
    UnknownStatus(String),

    #[error("Entry {0} is already notified")]
    AlreadyNotified(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
