//! Error types shared across the fintrack crates.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Retry policy class for failed remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Retryable,
    Permanent,
    ReauthRequired,
}

/// Errors surfaced by the sync core.
#[derive(Debug, Error)]
pub enum Error {
    /// Local durable store cannot be opened, read or written.
    /// Callers degrade to memory-only operation for the session.
    #[error("Local store unavailable: {0}")]
    StorageUnavailable(String),

    /// Remote host cannot be reached (connect/DNS/transport failure).
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// Remote call exceeded its deadline.
    #[error("Remote timeout: {0}")]
    RemoteTimeout(String),

    /// Remote accepted the connection but rejected the request.
    #[error("Remote rejected ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// No valid session, or the session expired mid-flight.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Bad caller input; never enqueued for retry.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl Error {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkUnreachable(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::RemoteTimeout(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            status,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthRequired(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify this error for the drain's replay policy.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::StorageUnavailable(_) => RetryClass::Retryable,
            Self::NetworkUnreachable(_) | Self::RemoteTimeout(_) => RetryClass::Retryable,
            Self::RemoteRejected { status, .. } => match *status {
                401 | 403 => RetryClass::ReauthRequired,
                408 | 409 | 423 | 425 | 429 => RetryClass::Retryable,
                500..=599 => RetryClass::Retryable,
                _ => RetryClass::Permanent,
            },
            Self::AuthRequired(_) => RetryClass::ReauthRequired,
            Self::Validation(_) => RetryClass::Permanent,
        }
    }
}
