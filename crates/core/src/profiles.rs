//! User profile model and offline fallback synthesis.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
}

/// Denormalized cache of remote profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub currency: String,
    pub theme: Theme,
}

impl UserProfile {
    /// Synthesize a profile when the remote fetch is unavailable (offline,
    /// or first login before a profile row exists). The display name falls
    /// back to the email local-part.
    pub fn fallback(user_id: &str, email: Option<&str>) -> Self {
        let email = email.unwrap_or_default();
        let full_name = email
            .split('@')
            .next()
            .filter(|part| !part.is_empty())
            .unwrap_or("Пользователь")
            .to_string();

        Self {
            id: user_id.to_string(),
            email: email.to_string(),
            full_name: Some(full_name),
            currency: "RUB".to_string(),
            theme: Theme::Dark,
        }
    }
}
