//! Queue Scanner - one end-to-end notification run
//!
//! Candidates are processed strictly one at a time: an entry's eligibility
//! depends on where the other waiting entries of its shop stand, so entry N
//! is fully evaluated, sent and recorded before entry N+1 is read.

use crate::application::dispatcher::{mask_phone, DispatchOutcome, NotificationDispatcher};
use crate::application::eligibility::{assess, ShopSnapshot};
use crate::domain::{Barber, QueueEntry, ShopConfig};
use crate::error::Result;
use crate::port::{CandidateFilter, MessageSender, QueueScope, QueueStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why an entry was left alone this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoPhoneNumber,
    NoBarbers,
    NoShopConfig,
    /// A per-shop read failed
    StoreUnavailable(String),
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Skipped(SkipReason),
    NotReady,
    Dispatched(DispatchOutcome),
}

/// Per-run tally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub candidates: usize,
    pub notified: usize,
    pub not_ready: usize,
    pub skipped: usize,
    pub send_failed: usize,
    pub write_failed: usize,
}

impl RunReport {
    fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Skipped(_) => self.skipped += 1,
            EntryOutcome::NotReady => self.not_ready += 1,
            EntryOutcome::Dispatched(DispatchOutcome::Notified { .. }) => self.notified += 1,
            EntryOutcome::Dispatched(DispatchOutcome::SendFailed(_)) => self.send_failed += 1,
            EntryOutcome::Dispatched(DispatchOutcome::RecordFailed { .. }) => {
                self.write_failed += 1
            }
        }
    }
}

/// Drives the evaluator and dispatcher over every pending entry
pub struct QueueScanner {
    store: Arc<dyn QueueStore>,
    dispatcher: NotificationDispatcher,
}

impl QueueScanner {
    pub fn new(store: Arc<dyn QueueStore>, sender: Arc<dyn MessageSender>) -> Self {
        let dispatcher = NotificationDispatcher::new(Arc::clone(&store), sender);
        Self { store, dispatcher }
    }

    /// Run once over all pending entries
    ///
    /// Only a failed candidate fetch is returned as an error; every
    /// per-entry problem is logged and counted in the report.
    pub async fn run(&self) -> Result<RunReport> {
        info!("Checking for waiting queue entries...");

        let candidates = match self.store.list_waiting(&CandidateFilter::pending()).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Failed to fetch waiting entries, aborting run");
                return Err(e);
            }
        };

        let mut report = RunReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        if candidates.is_empty() {
            info!("No entries to notify");
            return Ok(report);
        }

        for entry in &candidates {
            let outcome = self.process_entry(entry).await;
            report.record(&outcome);
        }

        info!(
            candidates = report.candidates,
            notified = report.notified,
            not_ready = report.not_ready,
            skipped = report.skipped,
            send_failed = report.send_failed,
            write_failed = report.write_failed,
            "Queue scan completed"
        );

        Ok(report)
    }

    /// Evaluate one candidate and dispatch it if eligible
    pub async fn process_entry(&self, entry: &QueueEntry) -> EntryOutcome {
        let Some(phone) = entry.contact_number() else {
            debug!(entry_id = %entry.id, "Skipping entry without phone number");
            return EntryOutcome::Skipped(SkipReason::NoPhoneNumber);
        };

        let (barbers, config) = match self.shop_context(&entry.shop_id).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(
                    entry_id = %entry.id,
                    shop_id = %entry.shop_id,
                    error = %e,
                    "Skipping entry, shop data unavailable"
                );
                return EntryOutcome::Skipped(SkipReason::StoreUnavailable(e.to_string()));
            }
        };

        if barbers.is_empty() {
            warn!(
                entry_id = %entry.id,
                shop_id = %entry.shop_id,
                customer = %entry.customer_name,
                "Skipping entry, shop has no barbers"
            );
            return EntryOutcome::Skipped(SkipReason::NoBarbers);
        }

        let Some(config) = config else {
            warn!(
                entry_id = %entry.id,
                shop_id = %entry.shop_id,
                customer = %entry.customer_name,
                "Skipping entry, shop configuration missing"
            );
            return EntryOutcome::Skipped(SkipReason::NoShopConfig);
        };

        let scope = QueueScope::for_entry(entry);
        let queue = match self.store.list_waiting_by_shop(&entry.shop_id, &scope).await {
            Ok(q) => q,
            Err(e) => {
                warn!(entry_id = %entry.id, error = %e, "Skipping entry, queue read failed");
                return EntryOutcome::Skipped(SkipReason::StoreUnavailable(e.to_string()));
            }
        };

        let snapshot = ShopSnapshot {
            queue: &queue,
            barbers: &barbers,
            notify_threshold: config.notify_threshold,
        };
        let assessment = assess(entry, &snapshot);

        if !assessment.should_notify() {
            info!(
                entry_id = %entry.id,
                customer = %entry.customer_name,
                assessment = ?assessment,
                "Not yet ready to notify"
            );
            return EntryOutcome::NotReady;
        }

        debug!(
            entry_id = %entry.id,
            to = %mask_phone(phone),
            position = ?assessment.position(),
            estimated_wait = ?assessment.estimated_wait(),
            "Entry eligible for notification"
        );

        EntryOutcome::Dispatched(self.dispatcher.dispatch(entry, phone).await)
    }

    async fn shop_context(&self, shop_id: &str) -> Result<(Vec<Barber>, Option<ShopConfig>)> {
        let barbers = self.store.get_barbers(shop_id).await?;
        let config = self.store.get_shop_config(shop_id).await?;
        Ok((barbers, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryStatus;
    use crate::port::message_sender::mocks::{MockSendBehavior, RecordingMessageSender};
    use crate::port::queue_store::mocks::InMemoryQueueStore;
    use crate::port::SendError;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn waiting(id: &str, shop: &str, minute: i64) -> QueueEntry {
        QueueEntry::new(id, shop, format!("Customer {}", id), at(minute))
            .with_phone(format!("+1555000{:04}", minute))
    }

    fn shop(store: &InMemoryQueueStore, shop_id: &str, threshold: i64, cut_times: &[Option<i64>]) {
        store.set_config(ShopConfig::new(shop_id, threshold));
        for (i, t) in cut_times.iter().enumerate() {
            store.add_barber(Barber::new(format!("{}-b{}", shop_id, i), shop_id, *t));
        }
    }

    fn scanner(
        store: &Arc<InMemoryQueueStore>,
        sender: &Arc<RecordingMessageSender>,
    ) -> QueueScanner {
        QueueScanner::new(store.clone(), sender.clone())
    }

    #[tokio::test]
    async fn test_empty_candidate_set() {
        let store = Arc::new(InMemoryQueueStore::new());
        let sender = Arc::new(RecordingMessageSender::new_success());

        let report = scanner(&store, &sender).run().await.unwrap();

        assert_eq!(report, RunReport::default());
        assert_eq!(sender.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fatal_fetch_makes_no_sends_or_writes() {
        let store = Arc::new(InMemoryQueueStore::new());
        shop(&store, "s1", 100, &[Some(10)]);
        store.add_entry(waiting("a", "s1", 0));
        store.fail_list_waiting(true);
        let sender = Arc::new(RecordingMessageSender::new_success());

        let result = scanner(&store, &sender).run().await;

        assert!(result.is_err());
        assert_eq!(sender.call_count(), 0);
        assert!(store.set_notified_calls().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_decides_who_is_notified() {
        let store = Arc::new(InMemoryQueueStore::new());
        shop(&store, "s1", 20, &[Some(10), Some(20), Some(15)]);
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            store.add_entry(waiting(id, "s1", i as i64));
        }
        let sender = Arc::new(RecordingMessageSender::new_success());

        let report = scanner(&store, &sender).run().await.unwrap();

        // positions 0, 1, 2 are within 20 minutes, position 3 is 30
        assert_eq!(report.notified, 3);
        assert_eq!(report.not_ready, 1);
        assert!(store.entry("c").unwrap().notified);
        assert!(!store.entry("d").unwrap().notified);
    }

    #[tokio::test]
    async fn test_missing_shop_data_skips_without_error() {
        let store = Arc::new(InMemoryQueueStore::new());
        // s1 has config but no barbers, s2 has barbers but no config
        store.set_config(ShopConfig::new("s1", 100));
        store.add_barber(Barber::new("b", "s2", Some(10)));
        store.add_entry(waiting("a", "s1", 0));
        store.add_entry(waiting("b", "s2", 1));
        let sender = Arc::new(RecordingMessageSender::new_success());
        let scanner = scanner(&store, &sender);

        let entry_a = store.entry("a").unwrap();
        assert_eq!(
            scanner.process_entry(&entry_a).await,
            EntryOutcome::Skipped(SkipReason::NoBarbers)
        );
        let entry_b = store.entry("b").unwrap();
        assert_eq!(
            scanner.process_entry(&entry_b).await,
            EntryOutcome::Skipped(SkipReason::NoShopConfig)
        );

        let report = scanner.run().await.unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(sender.call_count(), 0);
        assert!(store.set_notified_calls().is_empty());

        // still candidates on the next run
        assert_eq!(scanner.run().await.unwrap().candidates, 2);
    }

    #[tokio::test]
    async fn test_entry_without_phone_is_skipped() {
        let store = Arc::new(InMemoryQueueStore::new());
        shop(&store, "s1", 100, &[Some(10)]);
        store.add_entry(QueueEntry::new("a", "s1", "No Phone", at(0)));
        let sender = Arc::new(RecordingMessageSender::new_success());

        let report = scanner(&store, &sender).run().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(sender.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_send_retried_next_run() {
        let store = Arc::new(InMemoryQueueStore::new());
        shop(&store, "s1", 0, &[Some(10)]);
        store.add_entry(waiting("a", "s1", 0));
        let sender = Arc::new(RecordingMessageSender::new_fail(SendError::Rejected {
            status: 503,
            message: "unavailable".to_string(),
        }));
        let scanner = scanner(&store, &sender);

        let first = scanner.run().await.unwrap();
        assert_eq!(first.send_failed, 1);
        assert!(!store.entry("a").unwrap().notified);

        sender.set_behavior(MockSendBehavior::Success);
        let second = scanner.run().await.unwrap();
        assert_eq!(second.notified, 1);
        assert_eq!(sender.call_count(), 2);
        assert!(store.entry("a").unwrap().notified);
    }

    #[tokio::test]
    async fn test_one_shop_failure_does_not_stop_others() {
        let store = Arc::new(InMemoryQueueStore::new());
        shop(&store, "s1", 0, &[Some(10)]);
        shop(&store, "s2", 0, &[Some(10)]);
        store.add_entry(waiting("a", "s1", 0));
        store.add_entry(waiting("b", "s2", 1));
        store.fail_shop("s1");
        let sender = Arc::new(RecordingMessageSender::new_success());

        let report = scanner(&store, &sender).run().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.notified, 1);
        assert!(store.entry("b").unwrap().notified);
    }

    #[tokio::test]
    async fn test_repeated_runs_notify_once() {
        let store = Arc::new(InMemoryQueueStore::new());
        shop(&store, "s1", 0, &[Some(10)]);
        store.add_entry(waiting("a", "s1", 0).with_barber("s1-b0"));
        store.add_entry(waiting("b", "s1", 1).with_barber("s1-b0"));
        let sender = Arc::new(RecordingMessageSender::new_success());
        let scanner = scanner(&store, &sender);

        for _ in 0..3 {
            scanner.run().await.unwrap();
        }

        // b stays behind a, who is still waiting (notified but not served)
        assert_eq!(sender.call_count(), 1);
        assert_eq!(store.set_notified_calls(), vec!["a".to_string()]);

        store.update_status("a", EntryStatus::Served);
        scanner.run().await.unwrap();
        scanner.run().await.unwrap();
        assert_eq!(sender.call_count(), 2);
        assert_eq!(
            store.set_notified_calls(),
            vec!["a".to_string(), "b".to_string()]
        );
    }
}
