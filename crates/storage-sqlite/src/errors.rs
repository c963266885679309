//! Storage error type and its mapping into the core taxonomy.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised by the sqlite-backed local store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored value is corrupt: {0}")]
    Corrupt(String),

    #[error("Storage worker failed: {0}")]
    Worker(String),
}

impl StorageError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}

/// Every storage failure degrades the session to memory-only operation,
/// so the whole taxonomy collapses to `StorageUnavailable` at the core
/// boundary.
impl From<StorageError> for fintrack_core::Error {
    fn from(err: StorageError) -> Self {
        fintrack_core::Error::storage(err.to_string())
    }
}
