//! Store contracts the sync engine orchestrates.
//!
//! The traits live in core; the sqlite-backed local store and the HTTP
//! remote client implement them from their own crates.

use async_trait::async_trait;

use crate::errors::Result;
use crate::profiles::UserProfile;
use crate::session::Session;
use crate::sync::model::PendingMutation;
use crate::transactions::Transaction;

/// Durable, embedded cache of transactions plus the pending-mutation
/// queue. Failures surface as `Error::StorageUnavailable`; callers log
/// and degrade to memory-only operation.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// All cached transactions, in no particular order.
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// Upsert by id; idempotent.
    async fn put_transaction(&self, tx: &Transaction) -> Result<()>;

    /// Remove by id; no error when absent.
    async fn delete_transaction(&self, id: &str) -> Result<()>;

    /// Atomic full overwrite of the cache. Used by hydrate so records
    /// deleted remotely do not resurrect from stale local rows.
    async fn replace_transactions(&self, txs: &[Transaction]) -> Result<()>;

    /// Upsert a queue entry by its queue id.
    async fn enqueue(&self, mutation: &PendingMutation) -> Result<()>;

    /// Queue entries in enqueue (FIFO) order.
    async fn list_pending(&self) -> Result<Vec<PendingMutation>>;

    /// Remove one queue entry; no error when absent.
    async fn dequeue(&self, id: &str) -> Result<()>;

    /// Record a failed replay attempt against a queue entry.
    async fn record_failure(&self, id: &str, error: &str) -> Result<()>;
}

/// Client for the authoritative backend.
///
/// Create and delete must be idempotent: the queue gives at-least-once
/// delivery, so a replay after a crash between remote success and dequeue
/// must converge rather than fail or duplicate.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Current auth session, if any.
    async fn fetch_session(&self) -> Result<Option<Session>>;

    /// Profile for the session user; `None` when no profile row exists.
    async fn fetch_profile(&self, session: &Session) -> Result<Option<UserProfile>>;

    /// The session user's transactions, newest first.
    async fn list_transactions(&self, session: &Session) -> Result<Vec<Transaction>>;

    /// Create-or-replace by id.
    async fn upsert_transaction(&self, session: &Session, tx: &Transaction) -> Result<()>;

    /// Delete by id; an absent id is success.
    async fn delete_transaction(&self, session: &Session, id: &str) -> Result<()>;

    /// Best-effort auth teardown.
    async fn sign_out(&self, session: &Session) -> Result<()>;
}
