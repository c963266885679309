//! Wire payloads exchanged with the backend; domain models stay in core.

use serde::Deserialize;

use fintrack_core::Session;

/// Error body the backend returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// Session payload from the auth endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub access_token: String,
}

impl From<SessionPayload> for Session {
    fn from(payload: SessionPayload) -> Self {
        Session {
            user_id: payload.user_id,
            email: payload.email,
            access_token: payload.access_token,
        }
    }
}
