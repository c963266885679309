//! Sync engine: local-then-remote writes, hydrate pulls and queue drain.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::errors::{Error, Result, RetryClass};
use crate::profiles::UserProfile;
use crate::session::Session;
use crate::sync::model::{DrainSummary, MutationAction, PendingMutation};
use crate::sync::stores::{LocalStore, RemoteStore};
use crate::transactions::Transaction;

/// Where a recorded mutation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDisposition {
    /// Confirmed by the remote store.
    Synced,
    /// Waiting in the pending queue for the next drain.
    Queued,
}

/// Orchestrates the local store, the remote store and the pending queue.
/// The only component permitted to write to both stores.
///
/// Stateless with respect to session and connectivity; callers pass the
/// current session and online flag into each operation.
pub struct SyncEngine {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    // Single drain in flight; a second trigger skips instead of queueing.
    drain_guard: Mutex<()>,
}

impl SyncEngine {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            local,
            remote,
            drain_guard: Mutex::new(()),
        }
    }

    /// Fast hydrate path: cached transactions, available offline.
    pub async fn load_local(&self) -> Result<Vec<Transaction>> {
        self.local.list_transactions().await
    }

    /// Fetch the remote transaction list and overwrite the local cache
    /// with it. Remote is authoritative here: rows missing remotely are
    /// dropped locally rather than merged back.
    pub async fn pull_remote(&self, session: &Session) -> Result<Vec<Transaction>> {
        let remote_txs = self.remote.list_transactions(session).await?;
        if let Err(err) = self.local.replace_transactions(&remote_txs).await {
            warn!("[Sync] Failed to persist pulled transactions: {err}");
        }
        Ok(remote_txs)
    }

    pub async fn fetch_profile(&self, session: &Session) -> Result<Option<UserProfile>> {
        self.remote.fetch_profile(session).await
    }

    /// Persist a new transaction locally, then attempt the remote create.
    /// A remote failure (or a known-offline state) enqueues the mutation
    /// instead of surfacing an error.
    pub async fn record_create(
        &self,
        session: &Session,
        mut tx: Transaction,
        online: bool,
    ) -> Result<WriteDisposition> {
        if let Err(err) = self.local.put_transaction(&tx).await {
            warn!("[Sync] Local write failed for {}: {err}", tx.id);
        }

        if !online {
            self.enqueue_create(&tx).await;
            return Ok(WriteDisposition::Queued);
        }

        let mut remote_copy = tx.clone();
        remote_copy.synced = true;
        match self.remote.upsert_transaction(session, &remote_copy).await {
            Ok(()) => {
                tx.synced = true;
                if let Err(err) = self.local.put_transaction(&tx).await {
                    warn!("[Sync] Failed to mark {} synced locally: {err}", tx.id);
                }
                Ok(WriteDisposition::Synced)
            }
            Err(err) => {
                debug!(
                    "[Sync] Remote create for {} failed ({:?}): {err}",
                    tx.id,
                    err.retry_class()
                );
                self.enqueue_create(&tx).await;
                Ok(WriteDisposition::Queued)
            }
        }
    }

    /// Remove a transaction locally, then attempt the remote delete;
    /// failures enqueue a delete mutation under a `del-` prefixed queue id.
    /// A confirmed remote delete also drops any still-queued create for
    /// the id.
    pub async fn record_delete(
        &self,
        session: &Session,
        id: &str,
        online: bool,
    ) -> Result<WriteDisposition> {
        if let Err(err) = self.local.delete_transaction(id).await {
            warn!("[Sync] Local delete failed for {id}: {err}");
        }

        if !online {
            self.enqueue_entry(PendingMutation::delete(id)).await;
            return Ok(WriteDisposition::Queued);
        }

        match self.remote.delete_transaction(session, id).await {
            Ok(()) => {
                // A still-queued create for this id would resurrect the
                // record on the next drain; the confirmed remote delete
                // supersedes it.
                if let Err(err) = self.local.dequeue(id).await {
                    warn!("[Sync] Failed to drop stale create entry for {id}: {err}");
                }
                Ok(WriteDisposition::Synced)
            }
            Err(err) => {
                debug!(
                    "[Sync] Remote delete for {id} failed ({:?}): {err}",
                    err.retry_class()
                );
                self.enqueue_entry(PendingMutation::delete(id)).await;
                Ok(WriteDisposition::Queued)
            }
        }
    }

    /// Replay the pending queue in enqueue order.
    ///
    /// Policy: continue-on-error across transactions, strict ordering per
    /// transaction (a failed create blocks that transaction's later
    /// entries for the pass so a delete is never replayed before its
    /// create). Entries stay queued on failure regardless of retry class;
    /// a reauth-class failure aborts the rest of the pass since every
    /// call would fail the same way.
    pub async fn drain(&self, session: &Session) -> Result<DrainSummary> {
        let _guard = match self.drain_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("[Sync] Drain already in flight, skipping");
                return Ok(DrainSummary::skipped());
            }
        };

        let pending = self.local.list_pending().await?;
        if pending.is_empty() {
            return Ok(DrainSummary::default());
        }
        debug!("[Sync] Draining {} pending mutation(s)", pending.len());

        let mut summary = DrainSummary::default();
        let mut blocked: HashSet<String> = HashSet::new();

        for entry in pending {
            let tx_id = entry.transaction_id();
            if let Some(id) = tx_id.as_deref() {
                if blocked.contains(id) {
                    summary.failed += 1;
                    continue;
                }
            }

            match self.replay(session, &entry).await {
                Ok(()) => {
                    if let Err(err) = self.local.dequeue(&entry.id).await {
                        warn!("[Sync] Failed to dequeue {}: {err}", entry.id);
                    }
                    summary.replayed += 1;
                }
                Err(err) => {
                    let class = err.retry_class();
                    warn!(
                        "[Sync] Replay of {} ({:?}) failed ({class:?}): {err}",
                        entry.id, entry.action
                    );
                    if let Err(store_err) =
                        self.local.record_failure(&entry.id, &err.to_string()).await
                    {
                        warn!("[Sync] Failed to record replay failure: {store_err}");
                    }
                    summary.failed += 1;
                    if let Some(id) = tx_id {
                        blocked.insert(id);
                    }
                    if class == RetryClass::ReauthRequired {
                        debug!("[Sync] Aborting drain pass, re-authentication required");
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn replay(&self, session: &Session, entry: &PendingMutation) -> Result<()> {
        match entry.action {
            MutationAction::Create | MutationAction::Update => {
                let mut tx: Transaction = serde_json::from_value(entry.payload.clone())
                    .map_err(|e| Error::validation(format!("undecodable queue payload: {e}")))?;
                tx.synced = true;
                self.remote.upsert_transaction(session, &tx).await?;
                if let Err(err) = self.local.put_transaction(&tx).await {
                    warn!("[Sync] Failed to mark {} synced locally: {err}", tx.id);
                }
                Ok(())
            }
            MutationAction::Delete => {
                let id = entry
                    .transaction_id()
                    .ok_or_else(|| Error::validation("delete entry without transaction id"))?;
                self.remote.delete_transaction(session, &id).await
            }
        }
    }

    async fn enqueue_create(&self, tx: &Transaction) {
        match PendingMutation::create(tx) {
            Ok(entry) => self.enqueue_entry(entry).await,
            Err(err) => warn!("[Sync] Failed to encode create mutation for {}: {err}", tx.id),
        }
    }

    async fn enqueue_entry(&self, entry: PendingMutation) {
        if let Err(err) = self.local.enqueue(&entry).await {
            warn!("[Sync] Failed to enqueue {}: {err}", entry.id);
        }
    }
}
