// SQLite QueueStore Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use walkin_core::domain::{Barber, EntryId, EntryStatus, QueueEntry, ShopConfig};
use walkin_core::error::{AppError, Result};
use walkin_core::port::{CandidateFilter, QueueScope, QueueStore};

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Conflict(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

/// Columns read into `QueueEntryRow`
///
/// Every list query orders by `joined_at, rowid` so ties come back in
/// insertion order on every call.
const ENTRY_COLUMNS: &str = "id, shop_id, customer_name, phone_number, requested_barber_id, \
                             status, notified, joined_at";

pub struct SqliteQueueStore {
    pool: SqlitePool,
}

impl SqliteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a shop row (seeding and tests)
    pub async fn insert_shop(&self, config: &ShopConfig, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO barbershops (id, name, notify_threshold) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name,
                                          notify_threshold = excluded.notify_threshold
            "#,
        )
        .bind(&config.shop_id)
        .bind(name)
        .bind(config.notify_threshold)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Insert a barber (seeding and tests)
    pub async fn insert_barber(&self, barber: &Barber, name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO barbers (id, shop_id, name, average_cut_time) VALUES (?, ?, ?, ?)",
        )
        .bind(&barber.id)
        .bind(&barber.shop_id)
        .bind(name)
        .bind(barber.average_cut_time)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Insert a queue entry (seeding and tests)
    pub async fn insert_entry(&self, entry: &QueueEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                id, shop_id, customer_name, phone_number, requested_barber_id,
                status, notified, joined_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.shop_id)
        .bind(&entry.customer_name)
        .bind(&entry.phone_number)
        .bind(&entry.requested_barber_id)
        .bind(entry.status.as_str())
        .bind(entry.notified)
        .bind(entry.joined_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Move an entry to another status (front-desk actions in tests)
    pub async fn update_status(&self, id: &str, status: EntryStatus) -> Result<()> {
        let result = sqlx::query("UPDATE queue_entries SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Entry {} not found", id)));
        }
        Ok(())
    }

    pub async fn find_entry(&self, id: &str) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, QueueEntryRow>(&format!(
            "SELECT {} FROM queue_entries WHERE id = ?",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(QueueEntryRow::into_entry).transpose()
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn list_waiting(&self, filter: &CandidateFilter) -> Result<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<_, QueueEntryRow>(&format!(
            r#"
            SELECT {} FROM queue_entries
            WHERE status = ? AND notified = ?
            ORDER BY joined_at ASC, rowid ASC
            "#,
            ENTRY_COLUMNS
        ))
        .bind(filter.status.as_str())
        .bind(filter.notified)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(count = rows.len(), "Fetched candidate entries");
        rows.into_iter().map(QueueEntryRow::into_entry).collect()
    }

    async fn list_waiting_by_shop(
        &self,
        shop_id: &str,
        scope: &QueueScope,
    ) -> Result<Vec<QueueEntry>> {
        let waiting = EntryStatus::Waiting.as_str();

        let rows = match scope {
            QueueScope::WholeShop => {
                sqlx::query_as::<_, QueueEntryRow>(&format!(
                    r#"
                    SELECT {} FROM queue_entries
                    WHERE shop_id = ? AND status = ?
                    ORDER BY joined_at ASC, rowid ASC
                    "#,
                    ENTRY_COLUMNS
                ))
                .bind(shop_id)
                .bind(waiting)
                .fetch_all(&self.pool)
                .await
            }
            QueueScope::Barber(barber_id) => {
                sqlx::query_as::<_, QueueEntryRow>(&format!(
                    r#"
                    SELECT {} FROM queue_entries
                    WHERE shop_id = ? AND status = ? AND requested_barber_id = ?
                    ORDER BY joined_at ASC, rowid ASC
                    "#,
                    ENTRY_COLUMNS
                ))
                .bind(shop_id)
                .bind(waiting)
                .bind(barber_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(QueueEntryRow::into_entry).collect()
    }

    async fn get_barbers(&self, shop_id: &str) -> Result<Vec<Barber>> {
        let rows: Vec<BarberRow> = sqlx::query_as(
            "SELECT id, shop_id, average_cut_time FROM barbers WHERE shop_id = ? ORDER BY id",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|r| Barber::new(r.id, r.shop_id, r.average_cut_time))
            .collect())
    }

    async fn get_shop_config(&self, shop_id: &str) -> Result<Option<ShopConfig>> {
        let threshold: Option<i64> =
            sqlx::query_scalar("SELECT notify_threshold FROM barbershops WHERE id = ?")
                .bind(shop_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(threshold.map(|t| ShopConfig::new(shop_id, t)))
    }

    async fn set_notified(&self, entry_id: &EntryId) -> Result<()> {
        // Conditional update: only the first writer flips the flag
        let result =
            sqlx::query("UPDATE queue_entries SET notified = 1 WHERE id = ? AND notified = 0")
                .bind(entry_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT notified FROM queue_entries WHERE id = ?")
                    .bind(entry_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

            return match exists {
                None => Err(AppError::NotFound(format!("Entry {} not found", entry_id))),
                Some(_) => Err(AppError::Conflict(format!(
                    "Entry {} was already notified",
                    entry_id
                ))),
            };
        }

        Ok(())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct QueueEntryRow {
    id: String,
    shop_id: String,
    customer_name: String,
    phone_number: Option<String>,
    requested_barber_id: Option<String>,
    status: String,
    notified: bool,
    joined_at: i64, // epoch ms
}

impl QueueEntryRow {
    fn into_entry(self) -> Result<QueueEntry> {
        let status: EntryStatus = self.status.parse()?;
        let joined_at = DateTime::<Utc>::from_timestamp_millis(self.joined_at).ok_or_else(|| {
            AppError::Database(format!(
                "Entry {} has out-of-range joined_at {}",
                self.id, self.joined_at
            ))
        })?;

        Ok(QueueEntry {
            id: self.id,
            shop_id: self.shop_id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            // blank means no preference
            requested_barber_id: self
                .requested_barber_id
                .filter(|id| !id.trim().is_empty()),
            status,
            notified: self.notified,
            joined_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BarberRow {
    id: String,
    shop_id: String,
    average_cut_time: Option<i64>,
}
