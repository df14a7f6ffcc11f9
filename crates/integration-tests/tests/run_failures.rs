//! Runs that hit a failing store or SMS provider

use chrono::{DateTime, Utc};
use std::sync::Arc;
use walkin_core::application::{DispatchOutcome, EntryOutcome, QueueScanner};
use walkin_core::domain::{Barber, QueueEntry, ShopConfig};
use walkin_core::port::message_sender::mocks::{MockSendBehavior, RecordingMessageSender};
use walkin_core::port::queue_store::mocks::InMemoryQueueStore;
use walkin_core::port::SendError;
use walkin_core::AppError;
use walkin_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};

const SHOP: &str = "shop-1";

fn at(minute: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + minute * 60, 0).unwrap()
}

fn walk_in(id: &str, minute: i64) -> QueueEntry {
    QueueEntry::new(id, SHOP, id, at(minute)).with_phone("+15550001234")
}

async fn seed(store: &SqliteQueueStore) {
    store
        .insert_shop(&ShopConfig::new(SHOP, 30), "Corner Cuts")
        .await
        .unwrap();
    store
        .insert_barber(&Barber::new("barber-1", SHOP, Some(15)), "Joe")
        .await
        .unwrap();
    store.insert_entry(&walk_in("ann", 0)).await.unwrap();
    store.insert_entry(&walk_in("ben", 1)).await.unwrap();
}

#[tokio::test]
async fn test_failed_send_is_retried_next_run() {
    let pool = create_pool(":memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let store = Arc::new(SqliteQueueStore::new(pool));
    seed(&store).await;

    let sender = Arc::new(RecordingMessageSender::new_fail(SendError::Rejected {
        status: 429,
        message: "Too Many Requests".to_string(),
    }));
    let scanner = QueueScanner::new(store.clone(), sender.clone());

    let report = scanner.run().await.unwrap();
    assert_eq!(report.send_failed, 2);
    assert_eq!(report.notified, 0);
    assert!(!store.find_entry("ann").await.unwrap().unwrap().notified);
    assert!(!store.find_entry("ben").await.unwrap().unwrap().notified);

    sender.set_behavior(MockSendBehavior::Success);
    let report = scanner.run().await.unwrap();
    assert_eq!(report.candidates, 2);
    assert_eq!(report.notified, 2);
    assert!(store.find_entry("ann").await.unwrap().unwrap().notified);
    assert_eq!(sender.call_count(), 4);
}

#[tokio::test]
async fn test_unreadable_database_aborts_run_without_side_effects() {
    let db_path = std::env::temp_dir().join(format!("walkin-abort-{}.db", std::process::id()));
    let db_url = db_path.to_string_lossy().to_string();
    remove_db_files(&db_url);

    let pool = create_pool(&db_url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let store = Arc::new(SqliteQueueStore::new(pool.clone()));
    seed(&store).await;

    let sender = Arc::new(RecordingMessageSender::new_success());
    let scanner = QueueScanner::new(store, sender.clone());

    pool.close().await;
    let result = scanner.run().await;

    assert!(matches!(result, Err(AppError::Database(_))));
    assert_eq!(sender.call_count(), 0);

    // reopen and confirm nothing was written
    let reopened = SqliteQueueStore::new(create_pool(&db_url).await.unwrap());
    assert!(!reopened.find_entry("ann").await.unwrap().unwrap().notified);
    assert!(!reopened.find_entry("ben").await.unwrap().unwrap().notified);

    remove_db_files(&db_url);
}

fn remove_db_files(db_url: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", db_url, suffix));
    }
}

#[tokio::test]
async fn test_candidate_fetch_failure_sends_and_writes_nothing() {
    let store = Arc::new(InMemoryQueueStore::new());
    store.set_config(ShopConfig::new(SHOP, 30));
    store.add_barber(Barber::new("barber-1", SHOP, None));
    store.add_entry(walk_in("ann", 0));
    store.fail_list_waiting(true);

    let sender = Arc::new(RecordingMessageSender::new_success());
    let scanner = QueueScanner::new(store.clone(), sender.clone());

    assert!(scanner.run().await.is_err());
    assert_eq!(sender.call_count(), 0);
    assert!(store.set_notified_calls().is_empty());
}

#[tokio::test]
async fn test_failed_write_after_send_leaves_entry_pending() {
    let store = Arc::new(InMemoryQueueStore::new());
    store.set_config(ShopConfig::new(SHOP, 30));
    store.add_barber(Barber::new("barber-1", SHOP, None));
    store.add_entry(walk_in("ann", 0));
    store.fail_set_notified(true);

    let sender = Arc::new(RecordingMessageSender::new_success());
    let scanner = QueueScanner::new(store.clone(), sender.clone());

    let report = scanner.run().await.unwrap();
    assert_eq!(report.write_failed, 1);
    assert_eq!(sender.call_count(), 1);
    assert!(!store.entry("ann").unwrap().notified);

    // the customer is texted again once the store recovers
    store.fail_set_notified(false);
    let entry = store.entry("ann").unwrap();
    let outcome = scanner.process_entry(&entry).await;
    assert!(matches!(
        outcome,
        EntryOutcome::Dispatched(DispatchOutcome::Notified { .. })
    ));
    assert!(store.entry("ann").unwrap().notified);
    assert_eq!(sender.call_count(), 2);
}

#[tokio::test]
async fn test_one_broken_shop_does_not_block_others() {
    let store = Arc::new(InMemoryQueueStore::new());
    store.set_config(ShopConfig::new(SHOP, 30));
    store.add_barber(Barber::new("barber-1", SHOP, None));
    store.add_entry(walk_in("ann", 0));

    store.set_config(ShopConfig::new("shop-2", 30));
    store.add_barber(Barber::new("barber-9", "shop-2", None));
    store.add_entry(QueueEntry::new("zed", "shop-2", "Zed", at(1)).with_phone("+15550009876"));
    store.fail_shop("shop-2");

    let sender = Arc::new(RecordingMessageSender::new_success());
    let scanner = QueueScanner::new(store.clone(), sender.clone());

    let report = scanner.run().await.unwrap();
    assert_eq!(report.notified, 1);
    assert_eq!(report.skipped, 1);
    assert!(store.entry("ann").unwrap().notified);
    assert!(!store.entry("zed").unwrap().notified);
}
