//! fintrack-core: offline-first sync core of a personal finance tracker.
//!
//! Domain models, the sync engine and its store contracts, the
//! connectivity monitor, and the application state facade the
//! presentation layer consumes. Store implementations live in the
//! `fintrack-storage-sqlite` and `fintrack-remote` crates.

pub mod categories;
pub mod errors;
pub mod profiles;
pub mod session;
pub mod state;
pub mod sync;
pub mod transactions;

pub use categories::{default_categories, Category, CategoryKind};
pub use errors::{Error, Result, RetryClass};
pub use profiles::{Theme, UserProfile};
pub use session::Session;
pub use state::AppState;
pub use sync::{
    delete_queue_id, ConnectivityMonitor, DrainSummary, LocalStore, MutationAction,
    PendingMutation, RemoteStore, SyncEngine, WriteDisposition,
};
pub use transactions::{Transaction, TransactionDraft, TransactionType};
