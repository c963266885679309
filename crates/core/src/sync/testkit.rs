//! In-memory store fakes shared by engine and facade tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::errors::{Error, Result};
use crate::profiles::UserProfile;
use crate::session::Session;
use crate::sync::model::PendingMutation;
use crate::sync::stores::{LocalStore, RemoteStore};
use crate::transactions::Transaction;

pub(crate) fn test_session() -> Session {
    Session {
        user_id: "user-1".to_string(),
        email: Some("ivan@example.com".to_string()),
        access_token: "token".to_string(),
    }
}

/// Volatile `LocalStore` with the same upsert/FIFO semantics as the
/// sqlite implementation.
#[derive(Default)]
pub(crate) struct MemoryStore {
    transactions: Mutex<Vec<Transaction>>,
    queue: Mutex<Vec<PendingMutation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn put_transaction(&self, tx: &Transaction) -> Result<()> {
        let mut txs = self.transactions.lock().unwrap();
        txs.retain(|t| t.id != tx.id);
        txs.push(tx.clone());
        Ok(())
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.transactions.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn replace_transactions(&self, txs: &[Transaction]) -> Result<()> {
        *self.transactions.lock().unwrap() = txs.to_vec();
        Ok(())
    }

    async fn enqueue(&self, mutation: &PendingMutation) -> Result<()> {
        let mut queue = self.queue.lock().unwrap();
        queue.retain(|m| m.id != mutation.id);
        queue.push(mutation.clone());
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<PendingMutation>> {
        Ok(self.queue.lock().unwrap().clone())
    }

    async fn dequeue(&self, id: &str) -> Result<()> {
        self.queue.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn record_failure(&self, id: &str, error: &str) -> Result<()> {
        let mut queue = self.queue.lock().unwrap();
        if let Some(entry) = queue.iter_mut().find(|m| m.id == id) {
            entry.retry_count += 1;
            entry.last_error = Some(error.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RemoteCall {
    Upsert(String),
    Delete(String),
    ListTransactions,
    FetchProfile,
}

/// Scriptable `RemoteStore` that records every call.
#[derive(Default)]
pub(crate) struct ScriptedRemote {
    pub transactions: Mutex<Vec<Transaction>>,
    pub profile: Mutex<Option<UserProfile>>,
    pub calls: Mutex<Vec<RemoteCall>>,
    /// Transaction ids whose upsert/delete fails with a network error.
    pub fail_ids: Mutex<HashSet<String>>,
    /// When true, every call fails with a network error.
    pub unreachable: AtomicBool,
    /// When set, upserts wait for a permit before proceeding; lets tests
    /// hold a drain open.
    pub upsert_gate: Mutex<Option<Arc<Semaphore>>>,
    /// Same for transaction list fetches; lets tests hold a hydrate open.
    pub list_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_transaction(&self, id: &str) {
        self.fail_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn heal_transaction(&self, id: &str) {
        self.fail_ids.lock().unwrap().remove(id);
    }

    pub fn set_unreachable(&self, value: bool) {
        self.unreachable.store(value, Ordering::SeqCst);
    }

    pub fn recorded_calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<RemoteCall> {
        self.recorded_calls()
            .into_iter()
            .filter(|c| matches!(c, RemoteCall::Upsert(_) | RemoteCall::Delete(_)))
            .collect()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::network("remote unreachable"));
        }
        Ok(())
    }

    fn check_id(&self, id: &str) -> Result<()> {
        self.check_reachable()?;
        if self.fail_ids.lock().unwrap().contains(id) {
            return Err(Error::network("connection reset"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for ScriptedRemote {
    async fn fetch_session(&self) -> Result<Option<Session>> {
        self.check_reachable()?;
        Ok(None)
    }

    async fn fetch_profile(&self, _session: &Session) -> Result<Option<UserProfile>> {
        self.calls.lock().unwrap().push(RemoteCall::FetchProfile);
        self.check_reachable()?;
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn list_transactions(&self, _session: &Session) -> Result<Vec<Transaction>> {
        self.calls.lock().unwrap().push(RemoteCall::ListTransactions);
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.map_err(|_| Error::network("gate closed"))?;
        }
        self.check_reachable()?;
        let mut txs = self.transactions.lock().unwrap().clone();
        txs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(txs)
    }

    async fn upsert_transaction(&self, _session: &Session, tx: &Transaction) -> Result<()> {
        let gate = self.upsert_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.map_err(|_| Error::network("gate closed"))?;
        }
        self.calls
            .lock()
            .unwrap()
            .push(RemoteCall::Upsert(tx.id.clone()));
        self.check_id(&tx.id)?;
        let mut txs = self.transactions.lock().unwrap();
        txs.retain(|t| t.id != tx.id);
        txs.push(tx.clone());
        Ok(())
    }

    async fn delete_transaction(&self, _session: &Session, id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RemoteCall::Delete(id.to_string()));
        self.check_id(id)?;
        self.transactions.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn sign_out(&self, _session: &Session) -> Result<()> {
        self.check_reachable()
    }
}
