//! Connectivity monitor: edge-triggered drain on reconnect.
//!
//! The platform layer feeds online/offline transitions into a watch
//! channel; the monitor mirrors them into the facade's online flag and
//! triggers a queue drain on each offline-to-online edge. The engine's
//! single-flight guard absorbs flapping, so no debounce is needed here.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::state::AppState;

#[derive(Default)]
pub struct ConnectivityMonitor {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `signal`. Idempotent: a second spawn while the task
    /// is alive is a no-op; a finished task is cleared and respawned.
    pub async fn spawn(&self, state: Arc<AppState>, mut signal: watch::Receiver<bool>) {
        let mut guard = self.task.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
            guard.take();
        }

        let handle = tokio::spawn(async move {
            let mut was_online = *signal.borrow();
            state.set_online(was_online);

            while signal.changed().await.is_ok() {
                let online = *signal.borrow();
                state.set_online(online);
                if online && !was_online {
                    info!("[Connectivity] Back online, draining pending mutations");
                    match state.drain_pending().await {
                        Ok(summary) => debug!(
                            "[Connectivity] Drain complete replayed={} failed={} skipped={}",
                            summary.replayed, summary.failed, summary.skipped
                        ),
                        Err(err) => warn!("[Connectivity] Drain failed: {err}"),
                    }
                }
                was_online = online;
            }
        });
        *guard = Some(handle);
    }

    /// Abort the watcher task, if running.
    pub async fn stop(&self) {
        let mut guard = self.task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testkit::{test_session, MemoryStore, ScriptedRemote};
    use crate::transactions::{TransactionDraft, TransactionType};
    use rust_decimal_macros::dec;
    use std::time::Duration;

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
    async fn online_edge_triggers_drain() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(ScriptedRemote::new());
        let state = Arc::new(AppState::new(local.clone(), remote.clone()));
        state
            .handle_session_change(Some(test_session()))
            .await;

        state.set_online(false);
        state
            .add_transaction(TransactionDraft {
                amount: dec!(500),
                currency: "RUB".to_string(),
                category_id: "1".to_string(),
                date: chrono::Utc::now(),
                description: None,
                kind: TransactionType::Expense,
            })
            .await
            .expect("offline add");
        assert_eq!(local.pending_len(), 1);

        let (tx_signal, rx_signal) = watch::channel(false);
        let monitor = ConnectivityMonitor::new();
        monitor.spawn(state.clone(), rx_signal).await;

        tx_signal.send(true).expect("signal online");
        wait_until(|| local.pending_len() == 0).await;
        assert!(state.is_online());
        assert_eq!(remote.transactions.lock().unwrap().len(), 1);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn offline_edge_only_flips_the_flag() {
        let local = Arc::new(MemoryStore::new());
        let remote = Arc::new(ScriptedRemote::new());
        let state = Arc::new(AppState::new(local, remote.clone()));

        let (tx_signal, rx_signal) = watch::channel(true);
        let monitor = ConnectivityMonitor::new();
        monitor.spawn(state.clone(), rx_signal).await;
        wait_until(|| state.is_online()).await;

        tx_signal.send(false).expect("signal offline");
        wait_until(|| !state.is_online()).await;
        assert!(remote.recorded_calls().is_empty());

        monitor.stop().await;
    }
}
