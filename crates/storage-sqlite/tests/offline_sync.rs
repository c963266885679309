//! End-to-end offline flow over a real sqlite store: record while
//! offline, reconnect, drain against a fake remote.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use tempfile::tempdir;
use tokio::sync::watch;

use fintrack_core::sync::{ConnectivityMonitor, LocalStore, RemoteStore};
use fintrack_core::{
    AppState, Error, Result, Session, Transaction, TransactionDraft, TransactionType, UserProfile,
};
use fintrack_storage_sqlite::SqliteStore;

#[derive(Default)]
struct FakeBackend {
    transactions: Mutex<Vec<Transaction>>,
    insert_calls: Mutex<Vec<String>>,
    unreachable: AtomicBool,
}

impl FakeBackend {
    fn check(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(Error::network("remote unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FakeBackend {
    async fn fetch_session(&self) -> Result<Option<Session>> {
        Ok(None)
    }

    async fn fetch_profile(&self, _session: &Session) -> Result<Option<UserProfile>> {
        self.check()?;
        Ok(None)
    }

    async fn list_transactions(&self, _session: &Session) -> Result<Vec<Transaction>> {
        self.check()?;
        let mut txs = self.transactions.lock().unwrap().clone();
        txs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(txs)
    }

    async fn upsert_transaction(&self, _session: &Session, tx: &Transaction) -> Result<()> {
        self.check()?;
        self.insert_calls.lock().unwrap().push(tx.id.clone());
        let mut txs = self.transactions.lock().unwrap();
        txs.retain(|t| t.id != tx.id);
        txs.push(tx.clone());
        Ok(())
    }

    async fn delete_transaction(&self, _session: &Session, id: &str) -> Result<()> {
        self.check()?;
        self.transactions.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn sign_out(&self, _session: &Session) -> Result<()> {
        Ok(())
    }
}

fn session() -> Session {
    Session {
        user_id: "user-1".to_string(),
        email: Some("ivan@example.com".to_string()),
        access_token: "token".to_string(),
    }
}

fn groceries_draft() -> TransactionDraft {
    TransactionDraft {
        amount: dec!(500),
        currency: "RUB".to_string(),
        category_id: "groceries".to_string(),
        date: Utc::now(),
        description: None,
        kind: TransactionType::Expense,
    }
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 1s");
}

#[tokio::test]
async fn offline_expense_replays_on_reconnect() {
    let dir = tempdir().expect("tempdir");
    let local = Arc::new(SqliteStore::open(dir.path().join("fintrack.sqlite")).expect("open db"));
    let remote = Arc::new(FakeBackend::default());
    let state = Arc::new(AppState::new(local.clone(), remote.clone()));

    let (signal, receiver) = watch::channel(false);
    let monitor = ConnectivityMonitor::new();
    monitor.spawn(state.clone(), receiver).await;
    wait_until(|| !state.is_online()).await;

    remote.unreachable.store(true, Ordering::SeqCst);
    state.handle_session_change(Some(session())).await;

    let added = state
        .add_transaction(groceries_draft())
        .await
        .expect("offline add");

    assert_eq!(state.transactions().len(), 1);
    assert_eq!(local.list_transactions().await.expect("list").len(), 1);
    let pending = local.list_pending().await.expect("pending");
    assert_eq!(pending.len(), 1);
    assert!(remote.insert_calls.lock().unwrap().is_empty());

    remote.unreachable.store(false, Ordering::SeqCst);
    signal.send(true).expect("signal online");

    let mut drained = false;
    for _ in 0..100 {
        if remote.insert_calls.lock().unwrap().len() == 1
            && local.list_pending().await.expect("pending").is_empty()
        {
            drained = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(drained, "drain did not complete within 1s");

    assert_eq!(remote.insert_calls.lock().unwrap()[0], added.id);
    assert_eq!(remote.transactions.lock().unwrap().len(), 1);

    monitor.stop().await;
}

#[tokio::test]
async fn hydrate_replaces_stale_cache_rows() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("fintrack.sqlite");
    let local = Arc::new(SqliteStore::open(&path).expect("open db"));
    let remote = Arc::new(FakeBackend::default());

    let user = session();
    let stale = Transaction::from_draft(groceries_draft(), &user.user_id);
    let kept = Transaction::from_draft(groceries_draft(), &user.user_id);
    let fresh = Transaction::from_draft(groceries_draft(), &user.user_id);
    local.put_transaction(&stale).await.expect("seed stale");
    local.put_transaction(&kept).await.expect("seed kept");
    *remote.transactions.lock().unwrap() = vec![kept.clone(), fresh.clone()];

    let state = Arc::new(AppState::new(local.clone(), remote.clone()));
    state.handle_session_change(Some(user)).await;

    let mut in_memory: Vec<_> = state.transactions().iter().map(|t| t.id.clone()).collect();
    in_memory.sort();
    let mut expected = vec![kept.id.clone(), fresh.id.clone()];
    expected.sort();
    assert_eq!(in_memory, expected);

    // The overwrite reached the durable store: a reopen shows the same set.
    drop(state);
    drop(local);
    let reopened = SqliteStore::open(&path).expect("reopen");
    let mut cached: Vec<_> = reopened
        .list_transactions()
        .await
        .expect("list")
        .into_iter()
        .map(|t| t.id)
        .collect();
    cached.sort();
    assert_eq!(cached, expected);
}
