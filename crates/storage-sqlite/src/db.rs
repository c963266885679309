//! Database open and schema initialization.

use std::path::Path;

use log::debug;
use rusqlite::Connection;

use crate::errors::Result;

/// Open (or create) the database at `path` and ensure the schema exists.
pub fn open_or_init(path: &Path) -> Result<Connection> {
    debug!("[Store] Opening database at {}", path.display());
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// In-memory database, used by tests and as a degraded fallback.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        category_id TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT,
        kind TEXT NOT NULL,
        user_id TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS sync_queue(
        id TEXT PRIMARY KEY,
        action TEXT NOT NULL,
        payload TEXT NOT NULL,
        enqueued_at TEXT NOT NULL,
        retry_count INTEGER NOT NULL DEFAULT 0,
        last_error TEXT
    );
    "#,
    )?;
    Ok(())
}
