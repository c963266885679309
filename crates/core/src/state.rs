//! Application state facade.
//!
//! The single source of truth the presentation layer reads: session,
//! profile, in-memory collections and the loading/online flags. All
//! mutation entry points live here and delegate persistence to the sync
//! engine; no other component writes the in-memory collections.
//!
//! One instance per app session, passed explicitly; there is no ambient
//! global.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::categories::{default_categories, Category, CategoryKind};
use crate::errors::{Error, Result};
use crate::profiles::UserProfile;
use crate::session::Session;
use crate::sync::{DrainSummary, SyncEngine};
use crate::sync::stores::{LocalStore, RemoteStore};
use crate::transactions::{Transaction, TransactionDraft};

pub struct AppState {
    engine: SyncEngine,
    remote: Arc<dyn RemoteStore>,

    session: RwLock<Option<Session>>,
    profile: RwLock<Option<UserProfile>>,
    /// Newest-first by occurrence date.
    transactions: RwLock<Vec<Transaction>>,
    /// Local-only collection, reseeded from the defaults every session.
    categories: RwLock<Vec<Category>>,

    loading: AtomicBool,
    online: AtomicBool,
    /// Bumped on every session change; in-flight hydrates re-check it
    /// before publishing so stale results are discarded.
    hydrate_epoch: AtomicU64,
}

impl AppState {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            engine: SyncEngine::new(local, remote.clone()),
            remote,
            session: RwLock::new(None),
            profile: RwLock::new(None),
            transactions: RwLock::new(Vec::new()),
            categories: RwLock::new(default_categories()),
            loading: AtomicBool::new(true),
            online: AtomicBool::new(true),
            hydrate_epoch: AtomicU64::new(0),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap().clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.read().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().unwrap().clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.read().unwrap().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    // ── Session lifecycle ────────────────────────────────────────────────

    /// Ask the remote for the current session and hydrate from it. Fetch
    /// errors resolve to no-session; loading ends either way.
    pub async fn bootstrap(&self) {
        let session = match self.remote.fetch_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!("[State] Session fetch failed: {err}");
                None
            }
        };
        self.handle_session_change(session).await;
    }

    /// Callback for the external auth collaborator. A new session starts
    /// a hydrate; a cleared session wipes the in-memory view (the local
    /// durable store is retained for a fast next sign-in).
    pub async fn handle_session_change(&self, session: Option<Session>) {
        let epoch = self.bump_epoch();
        match session {
            Some(session) => {
                *self.session.write().unwrap() = Some(session.clone());
                self.hydrate(session, epoch).await;
            }
            None => {
                *self.session.write().unwrap() = None;
                *self.profile.write().unwrap() = None;
                self.transactions.write().unwrap().clear();
                *self.categories.write().unwrap() = default_categories();
                self.loading.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Best-effort remote teardown, then clear the session.
    pub async fn sign_out(&self) {
        if let Some(session) = self.session() {
            if let Err(err) = self.remote.sign_out(&session).await {
                warn!("[State] Remote sign-out failed: {err}");
            }
        }
        self.handle_session_change(None).await;
    }

    async fn hydrate(&self, session: Session, epoch: u64) {
        self.loading.store(true, Ordering::SeqCst);

        // Local fast path: publish the cache immediately so the view works
        // offline while remote calls are in flight.
        match self.engine.load_local().await {
            Ok(mut local) => {
                local.sort_by(|a, b| b.date.cmp(&a.date));
                if self.epoch_current(epoch) {
                    *self.transactions.write().unwrap() = local;
                }
            }
            Err(err) => warn!("[State] Local cache unavailable, memory-only session: {err}"),
        }

        let fallback = UserProfile::fallback(&session.user_id, session.email.as_deref());
        if self.epoch_current(epoch) {
            *self.profile.write().unwrap() = Some(fallback);
        }

        if self.is_online() {
            match self.engine.fetch_profile(&session).await {
                Ok(Some(profile)) => {
                    if self.epoch_current(epoch) {
                        *self.profile.write().unwrap() = Some(profile);
                    }
                }
                Ok(None) => debug!("[State] No remote profile yet, keeping fallback"),
                Err(err) => warn!("[State] Profile fetch failed: {err}"),
            }

            match self.engine.pull_remote(&session).await {
                Ok(mut remote_txs) => {
                    remote_txs.sort_by(|a, b| b.date.cmp(&a.date));
                    if self.epoch_current(epoch) {
                        *self.transactions.write().unwrap() = remote_txs;
                    }
                }
                Err(err) => warn!("[State] Remote pull failed, serving cached view: {err}"),
            }
        }

        if self.epoch_current(epoch) {
            self.loading.store(false, Ordering::SeqCst);
        }
    }

    fn bump_epoch(&self) -> u64 {
        self.hydrate_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn epoch_current(&self, epoch: u64) -> bool {
        self.hydrate_epoch.load(Ordering::SeqCst) == epoch
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Record a new transaction. The in-memory list is updated before the
    /// first await, so the view never lags a user action; persistence and
    /// replication happen behind it.
    pub async fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        let session = self
            .session()
            .ok_or_else(|| Error::auth("no active session"))?;
        if draft.amount < Decimal::ZERO {
            return Err(Error::validation("amount must be non-negative"));
        }

        let tx = Transaction::from_draft(draft, &session.user_id);
        self.transactions.write().unwrap().insert(0, tx.clone());

        let online = self.is_online();
        self.engine.record_create(&session, tx.clone(), online).await?;
        Ok(tx)
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<()> {
        let session = self
            .session()
            .ok_or_else(|| Error::auth("no active session"))?;

        self.transactions.write().unwrap().retain(|t| t.id != id);

        let online = self.is_online();
        self.engine.record_delete(&session, id, online).await?;
        Ok(())
    }

    pub fn add_category(
        &self,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        kind: CategoryKind,
    ) -> Category {
        let category = Category {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            kind,
            user_id: self.session().map(|s| s.user_id),
        };
        self.categories.write().unwrap().push(category.clone());
        category
    }

    pub fn delete_category(&self, id: &str) {
        self.categories.write().unwrap().retain(|c| c.id != id);
    }

    /// Replay the pending queue. Called by the connectivity monitor on
    /// reconnect; also public for a manual "sync now".
    pub async fn drain_pending(&self) -> Result<DrainSummary> {
        let session = self
            .session()
            .ok_or_else(|| Error::auth("no active session"))?;
        self.engine.drain(&session).await
    }
}
