//! Pending-mutation queue entries and drain bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::transactions::Transaction;

/// Queue entry id for a pending delete. Prefixed so it cannot collide
/// with a pending create for the same transaction (create entries use
/// the transaction id directly).
pub fn delete_queue_id(transaction_id: &str) -> String {
    format!("del-{transaction_id}")
}

/// Supported replay operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

/// A mutation that reached the local store but has not yet been confirmed
/// by the remote store. Destroyed only after a successful remote replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMutation {
    pub id: String,
    pub action: MutationAction,
    /// Full transaction for create/update, `{"id": ...}` for delete.
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    /// Diagnostic only; never consulted for scheduling.
    #[serde(default)]
    pub retry_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl PendingMutation {
    pub fn create(tx: &Transaction) -> Result<Self> {
        Ok(Self {
            id: tx.id.clone(),
            action: MutationAction::Create,
            payload: serde_json::to_value(tx)
                .map_err(|e| crate::errors::Error::validation(e.to_string()))?,
            enqueued_at: Utc::now(),
            retry_count: 0,
            last_error: None,
        })
    }

    pub fn delete(transaction_id: &str) -> Self {
        Self {
            id: delete_queue_id(transaction_id),
            action: MutationAction::Delete,
            payload: serde_json::json!({ "id": transaction_id }),
            enqueued_at: Utc::now(),
            retry_count: 0,
            last_error: None,
        }
    }

    /// Id of the transaction this entry concerns, derived from the payload.
    /// Used to keep per-transaction ordering during a drain pass.
    pub fn transaction_id(&self) -> Option<String> {
        self.payload
            .get("id")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Entries replayed remotely and dequeued.
    pub replayed: usize,
    /// Entries that failed (or were blocked by an earlier failure for the
    /// same transaction) and remain queued.
    pub failed: usize,
    /// True when another drain was already in flight and this one did
    /// nothing.
    pub skipped: bool,
}

impl DrainSummary {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}
