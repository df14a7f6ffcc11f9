// Queue Entry Domain Model

use super::barber::BarberId;
use super::error::{DomainError, Result};
use super::shop::ShopId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Queue entry identifier
pub type EntryId = String;

/// Entry status
///
/// Only `Waiting` entries are ever evaluated. The other states are set by
/// the front desk and are read here just so rows round-trip cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Waiting,
    Serving,
    Served,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Waiting => "waiting",
            EntryStatus::Serving => "serving",
            EntryStatus::Served => "served",
            EntryStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "waiting" => Ok(EntryStatus::Waiting),
            "serving" => Ok(EntryStatus::Serving),
            "served" => Ok(EntryStatus::Served),
            "cancelled" => Ok(EntryStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// One customer's visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub shop_id: ShopId,
    pub customer_name: String,
    pub phone_number: Option<String>,

    /// `None` means the customer takes whichever barber frees up first
    pub requested_barber_id: Option<BarberId>,

    pub status: EntryStatus,
    pub notified: bool,
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Create a fresh waiting, unnotified entry
    pub fn new(
        id: impl Into<String>,
        shop_id: impl Into<String>,
        customer_name: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            shop_id: shop_id.into(),
            customer_name: customer_name.into(),
            phone_number: None,
            requested_barber_id: None,
            status: EntryStatus::Waiting,
            notified: false,
            joined_at,
        }
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_barber(mut self, barber_id: impl Into<String>) -> Self {
        self.requested_barber_id = Some(barber_id.into());
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    /// Phone number, treating blank strings as absent
    pub fn contact_number(&self) -> Option<&str> {
        self.phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Flip `notified` to true. Fails if it was already set.
    pub fn mark_notified(&mut self) -> Result<()> {
        if self.notified {
            return Err(DomainError::AlreadyNotified(self.id.clone()));
        }
        self.notified = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry() -> QueueEntry {
        let joined = Utc.with_ymd_and_hms(2024, 5, 4, 9, 30, 0).unwrap();
        QueueEntry::new("e1", "shop-1", "Sam", joined)
    }

    #[test]
    fn test_new_entry_is_waiting_and_unnotified() {
        let e = entry();
        assert_eq!(e.status, EntryStatus::Waiting);
        assert!(!e.notified);
        assert!(e.requested_barber_id.is_none());
    }

    #[test]
    fn test_mark_notified_only_once() {
        let mut e = entry();
        assert!(e.mark_notified().is_ok());
        assert!(e.notified);
        assert!(matches!(
            e.mark_notified(),
            Err(DomainError::AlreadyNotified(id)) if id == "e1"
        ));
    }

    #[test]
    fn test_blank_phone_is_no_contact() {
        assert_eq!(entry().contact_number(), None);
        assert_eq!(entry().with_phone("   ").contact_number(), None);
        assert_eq!(
            entry().with_phone(" +15551234567 ").contact_number(),
            Some("+15551234567")
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("waiting".parse::<EntryStatus>().unwrap(), EntryStatus::Waiting);
        assert_eq!("served".parse::<EntryStatus>().unwrap(), EntryStatus::Served);
        assert!("gone".parse::<EntryStatus>().is_err());
        assert_eq!(EntryStatus::Cancelled.to_string(), "cancelled");
    }
}
