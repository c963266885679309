//! Error types for the remote backend client.

use thiserror::Error;

/// Result type alias for remote client operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur talking to the backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Missing or malformed credentials
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl RemoteError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map into the core taxonomy: transport failures are retryable network
/// conditions, 401/403 force re-authentication, everything else the
/// backend said is a rejection carrying its status.
impl From<RemoteError> for fintrack_core::Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Http(e) if e.is_timeout() => {
                fintrack_core::Error::timeout(e.to_string())
            }
            RemoteError::Http(e) => fintrack_core::Error::network(e.to_string()),
            RemoteError::Json(e) => {
                fintrack_core::Error::rejected(0, format!("invalid response body: {e}"))
            }
            RemoteError::Api { status, message } if status == 401 || status == 403 => {
                fintrack_core::Error::auth(message)
            }
            RemoteError::Api { status, message } => {
                fintrack_core::Error::rejected(status, message)
            }
            RemoteError::Auth(message) => fintrack_core::Error::auth(message),
        }
    }
}
