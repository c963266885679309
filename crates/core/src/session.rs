//! Auth session handle.
//!
//! Sessions are established by an external auth collaborator; the core
//! only needs presence, the owning user id, and an opaque bearer token
//! for remote calls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub access_token: String,
}
