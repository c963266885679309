//! SQLite-backed `LocalStore` implementation.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use fintrack_core::sync::{LocalStore, PendingMutation};
use fintrack_core::Transaction;

use crate::db;
use crate::errors::{Result, StorageError};

fn enum_to_db<T: serde::Serialize>(value: &T) -> Result<String> {
    let encoded = serde_json::to_string(value).map_err(|e| StorageError::corrupt(e.to_string()))?;
    Ok(encoded.trim_matches('"').to_string())
}

fn enum_from_db<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(&format!("\"{}\"", value))
        .map_err(|e| StorageError::corrupt(format!("bad enum value '{value}': {e}")))
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::corrupt(format!("bad date '{value}': {e}")))
}

fn parse_amount(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| StorageError::corrupt(format!("bad amount '{value}': {e}")))
}

type TransactionRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
);

fn to_transaction(row: TransactionRow) -> Result<Transaction> {
    let (id, amount, currency, category_id, date, description, kind, user_id, synced) = row;
    Ok(Transaction {
        id,
        amount: parse_amount(&amount)?,
        currency,
        category_id,
        date: parse_date(&date)?,
        description,
        kind: enum_from_db(&kind)?,
        user_id,
        synced: synced != 0,
    })
}

fn put_transaction_tx(conn: &Connection, tx: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, amount, currency, category_id, date, description, kind, user_id, synced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
             amount = excluded.amount,
             currency = excluded.currency,
             category_id = excluded.category_id,
             date = excluded.date,
             description = excluded.description,
             kind = excluded.kind,
             user_id = excluded.user_id,
             synced = excluded.synced",
        params![
            tx.id,
            tx.amount.to_string(),
            tx.currency,
            tx.category_id,
            tx.date.to_rfc3339(),
            tx.description,
            enum_to_db(&tx.kind)?,
            tx.user_id,
            tx.synced as i64,
        ],
    )?;
    Ok(())
}

/// Durable cache of transactions plus the pending-mutation queue, backed
/// by one sqlite connection. The connection is serialized behind a mutex
/// and all work runs on the blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(db::open_or_init(path.as_ref())?)),
        })
    }

    /// In-memory store; contents die with the process.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(db::open_in_memory()?)),
        })
    }

    async fn with_conn<T, F>(&self, job: F) -> fintrack_core::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Worker("connection mutex poisoned".to_string()))?;
            job(&mut guard)
        })
        .await
        .map_err(|e| fintrack_core::Error::storage(format!("storage worker failed: {e}")))?;
        result.map_err(Into::into)
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn list_transactions(&self) -> fintrack_core::Result<Vec<Transaction>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, amount, currency, category_id, date, description, kind, user_id, synced
                 FROM transactions",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ))
            })?;
            rows.map(|row| to_transaction(row?)).collect()
        })
        .await
    }

    async fn put_transaction(&self, tx: &Transaction) -> fintrack_core::Result<()> {
        let tx = tx.clone();
        self.with_conn(move |conn| put_transaction_tx(conn, &tx)).await
    }

    async fn delete_transaction(&self, id: &str) -> fintrack_core::Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
    }

    async fn replace_transactions(&self, txs: &[Transaction]) -> fintrack_core::Result<()> {
        let txs = txs.to_vec();
        self.with_conn(move |conn| {
            let db_tx = conn.transaction()?;
            db_tx.execute("DELETE FROM transactions", [])?;
            for tx in &txs {
                put_transaction_tx(&db_tx, tx)?;
            }
            db_tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn enqueue(&self, mutation: &PendingMutation) -> fintrack_core::Result<()> {
        let mutation = mutation.clone();
        self.with_conn(move |conn| {
            let payload = serde_json::to_string(&mutation.payload)
                .map_err(|e| StorageError::corrupt(e.to_string()))?;
            conn.execute(
                "INSERT INTO sync_queue (id, action, payload, enqueued_at, retry_count, last_error)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     action = excluded.action,
                     payload = excluded.payload,
                     enqueued_at = excluded.enqueued_at,
                     retry_count = excluded.retry_count,
                     last_error = excluded.last_error",
                params![
                    mutation.id,
                    enum_to_db(&mutation.action)?,
                    payload,
                    mutation.enqueued_at.to_rfc3339(),
                    mutation.retry_count,
                    mutation.last_error,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_pending(&self) -> fintrack_core::Result<Vec<PendingMutation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, action, payload, enqueued_at, retry_count, last_error
                 FROM sync_queue ORDER BY enqueued_at, rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?;
            rows.map(|row| {
                let (id, action, payload, enqueued_at, retry_count, last_error) = row?;
                Ok(PendingMutation {
                    id,
                    action: enum_from_db(&action)?,
                    payload: serde_json::from_str(&payload)
                        .map_err(|e| StorageError::corrupt(format!("bad queue payload: {e}")))?,
                    enqueued_at: parse_date(&enqueued_at)?,
                    retry_count,
                    last_error,
                })
            })
            .collect()
        })
        .await
    }

    async fn dequeue(&self, id: &str) -> fintrack_core::Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM sync_queue WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
    }

    async fn record_failure(&self, id: &str, error: &str) -> fintrack_core::Result<()> {
        let id = id.to_string();
        let error = error.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE sync_queue SET retry_count = retry_count + 1, last_error = ?2 WHERE id = ?1",
                params![id, error],
            )?;
            Ok(())
        })
        .await
    }
}
