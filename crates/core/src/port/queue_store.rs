// Queue Store Port (Interface)

use crate::domain::{Barber, BarberId, EntryId, EntryStatus, QueueEntry, ShopConfig};
use crate::error::Result;
use async_trait::async_trait;

/// Filter for the candidate scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFilter {
    pub status: EntryStatus,
    pub notified: bool,
}

impl CandidateFilter {
    /// Waiting entries that have not been alerted yet
    pub fn pending() -> Self {
        Self {
            status: EntryStatus::Waiting,
            notified: false,
        }
    }
}

/// Which slice of a shop's waiting line to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueScope {
    /// Every waiting entry in the shop, whatever barber it asked for
    WholeShop,
    /// Only waiting entries that requested this barber
    Barber(BarberId),
}

impl QueueScope {
    /// Scope an entry is measured against: its barber's line if it asked
    /// for one, the whole shop otherwise
    pub fn for_entry(entry: &QueueEntry) -> Self {
        match &entry.requested_barber_id {
            Some(barber_id) => QueueScope::Barber(barber_id.clone()),
            None => QueueScope::WholeShop,
        }
    }
}

/// Repository interface for the shop queue
///
/// Every list of entries is ordered by `joined_at` ascending. Ties must be
/// broken the same way on every call.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Entries across all shops matching the filter
    async fn list_waiting(&self, filter: &CandidateFilter) -> Result<Vec<QueueEntry>>;

    /// Waiting entries for one shop, restricted to the scope
    async fn list_waiting_by_shop(&self, shop_id: &str, scope: &QueueScope)
        -> Result<Vec<QueueEntry>>;

    /// All barbers working at the shop
    async fn get_barbers(&self, shop_id: &str) -> Result<Vec<Barber>>;

    /// Shop settings (None if the shop is unknown)
    async fn get_shop_config(&self, shop_id: &str) -> Result<Option<ShopConfig>>;

    /// Set `notified = true` on one entry
    async fn set_notified(&self, entry_id: &EntryId) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory queue store with failure injection
    #[derive(Default)]
    pub struct InMemoryQueueStore {
        entries: Mutex<Vec<QueueEntry>>,
        barbers: Mutex<Vec<Barber>>,
        configs: Mutex<HashMap<String, ShopConfig>>,
        fail_list_waiting: Mutex<bool>,
        fail_set_notified: Mutex<bool>,
        fail_shops: Mutex<HashSet<String>>,
        set_notified_calls: Mutex<Vec<EntryId>>,
    }

    impl InMemoryQueueStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_entry(&self, entry: QueueEntry) {
            self.entries.lock().unwrap().push(entry);
        }

        pub fn add_barber(&self, barber: Barber) {
            self.barbers.lock().unwrap().push(barber);
        }

        pub fn set_config(&self, config: ShopConfig) {
            self.configs
                .lock()
                .unwrap()
                .insert(config.shop_id.clone(), config);
        }

        /// Make the candidate scan fail
        pub fn fail_list_waiting(&self, fail: bool) {
            *self.fail_list_waiting.lock().unwrap() = fail;
        }

        /// Make every `set_notified` fail
        pub fn fail_set_notified(&self, fail: bool) {
            *self.fail_set_notified.lock().unwrap() = fail;
        }

        /// Make every per-shop read for this shop fail
        pub fn fail_shop(&self, shop_id: impl Into<String>) {
            self.fail_shops.lock().unwrap().insert(shop_id.into());
        }

        pub fn entry(&self, id: &str) -> Option<QueueEntry> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.id == id)
                .cloned()
        }

        pub fn update_status(&self, id: &str, status: EntryStatus) {
            if let Some(e) = self.entries.lock().unwrap().iter_mut().find(|e| e.id == id) {
                e.status = status;
            }
        }

        /// Entry ids passed to `set_notified`, in call order
        pub fn set_notified_calls(&self) -> Vec<EntryId> {
            self.set_notified_calls.lock().unwrap().clone()
        }

        fn check_shop(&self, shop_id: &str) -> Result<()> {
            if self.fail_shops.lock().unwrap().contains(shop_id) {
                return Err(AppError::Database(format!("shop {} unavailable", shop_id)));
            }
            Ok(())
        }

        fn ordered(&self, keep: impl Fn(&QueueEntry) -> bool) -> Vec<QueueEntry> {
            let mut out: Vec<QueueEntry> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| keep(e))
                .cloned()
                .collect();
            // stable: insertion order breaks ties
            out.sort_by_key(|e| e.joined_at);
            out
        }
    }

    #[async_trait]
    impl QueueStore for InMemoryQueueStore {
        async fn list_waiting(&self, filter: &CandidateFilter) -> Result<Vec<QueueEntry>> {
            if *self.fail_list_waiting.lock().unwrap() {
                return Err(AppError::Database("connection refused".to_string()));
            }
            Ok(self.ordered(|e| e.status == filter.status && e.notified == filter.notified))
        }

        async fn list_waiting_by_shop(
            &self,
            shop_id: &str,
            scope: &QueueScope,
        ) -> Result<Vec<QueueEntry>> {
            self.check_shop(shop_id)?;
            Ok(self.ordered(|e| {
                e.shop_id == shop_id
                    && e.status == EntryStatus::Waiting
                    && match scope {
                        QueueScope::WholeShop => true,
                        QueueScope::Barber(id) => e.requested_barber_id.as_ref() == Some(id),
                    }
            }))
        }

        async fn get_barbers(&self, shop_id: &str) -> Result<Vec<Barber>> {
            self.check_shop(shop_id)?;
            Ok(self
                .barbers
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.shop_id == shop_id)
                .cloned()
                .collect())
        }

        async fn get_shop_config(&self, shop_id: &str) -> Result<Option<ShopConfig>> {
            self.check_shop(shop_id)?;
            Ok(self.configs.lock().unwrap().get(shop_id).cloned())
        }

        async fn set_notified(&self, entry_id: &EntryId) -> Result<()> {
            self.set_notified_calls.lock().unwrap().push(entry_id.clone());
            if *self.fail_set_notified.lock().unwrap() {
                return Err(AppError::Database("write timed out".to_string()));
            }
            let mut entries = self.entries.lock().unwrap();
            let entry = entries
                .iter_mut()
                .find(|e| &e.id == entry_id)
                .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;
            entry.mark_notified()?;
            Ok(())
        }
    }
}
