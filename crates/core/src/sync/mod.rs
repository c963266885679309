//! Offline-first synchronization: store contracts, the sync engine, the
//! pending-mutation queue model and the connectivity monitor.

pub mod engine;
pub mod model;
pub mod monitor;
pub mod stores;

#[cfg(test)]
pub(crate) mod testkit;

pub use engine::{SyncEngine, WriteDisposition};
pub use model::{delete_queue_id, DrainSummary, MutationAction, PendingMutation};
pub use monitor::ConnectivityMonitor;
pub use stores::{LocalStore, RemoteStore};
