//! Transaction domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a transaction. The amount is always a non-negative
/// magnitude; the sign lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

/// A recorded income or expense entry.
///
/// The id is generated client-side at creation and is identical locally
/// and remotely; the remote create is an upsert keyed on it, so replaying
/// the same create twice converges to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub user_id: String,
    /// Bookkeeping flag; the pending queue is the authoritative marker
    /// for records that still need a remote write.
    #[serde(default)]
    pub synced: bool,
}

/// The transaction shape accepted from the presentation layer, before an
/// id and owner are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub currency: String,
    pub category_id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Transaction {
    /// Materialize a draft into a full transaction owned by `user_id`,
    /// with a fresh UUID v4 id and `synced = false`.
    pub fn from_draft(draft: TransactionDraft, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount: draft.amount,
            currency: draft.currency,
            category_id: draft.category_id,
            date: draft.date,
            description: draft.description,
            kind: draft.kind,
            user_id: user_id.to_string(),
            synced: false,
        }
    }
}
