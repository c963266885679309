//! HTTP client for the authoritative transaction backend.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use fintrack_core::sync::RemoteStore;
use fintrack_core::{Session, Transaction, UserProfile};

use crate::error::{RemoteError, Result};
use crate::types::{ApiErrorBody, SessionPayload};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_KEY_HEADER: &str = "x-api-key";

/// Client for the fintrack backend REST API.
///
/// One attempt per call, no internal retry: replaying failed mutations is
/// the pending queue's job.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteClient {
    /// Create a new client for the API at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Read `FINTRACK_API_URL` / `FINTRACK_API_KEY` from the environment,
    /// defaulting to a local backend.
    pub fn from_env() -> Self {
        let base_url = std::env::var("FINTRACK_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:8787".to_string());
        let api_key = std::env::var("FINTRACK_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::new(&base_url, api_key)
    }

    /// Headers carrying the api key but no user credentials.
    fn base_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(api_key)
                .map_err(|_| RemoteError::auth("Invalid API key format"))?;
            headers.insert(API_KEY_HEADER, value);
        }
        Ok(headers)
    }

    /// Headers for a request on behalf of `session`.
    fn headers(&self, session: &Session) -> Result<HeaderMap> {
        let mut headers = self.base_headers()?;
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|_| RemoteError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    fn api_error(status: StatusCode, body: &str) -> RemoteError {
        if let Ok(error) = serde_json::from_str::<ApiErrorBody>(body) {
            return RemoteError::api(
                status.as_u16(),
                format!("{}: {}", error.code, error.message),
            );
        }
        RemoteError::api(status.as_u16(), format!("Request failed: {}", body))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            RemoteError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Check for success, discarding the body.
    async fn expect_success(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        debug!("API response error ({}): {}", status, body);
        Err(Self::api_error(status, &body))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────

    /// Current auth session, if any.
    ///
    /// GET /api/v1/auth/session
    async fn get_session(&self) -> Result<Option<SessionPayload>> {
        let url = format!("{}/api/v1/auth/session", self.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.base_headers()?)
            .send()
            .await?;

        // No session reads as absence, not as a failure.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED
        ) {
            return Ok(None);
        }
        Ok(Some(Self::parse_response(response).await?))
    }

    /// Tear down the session server-side.
    ///
    /// POST /api/v1/auth/sign-out
    async fn post_sign_out(&self, session: &Session) -> Result<()> {
        let url = format!("{}/api/v1/auth/sign-out", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers(session)?)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Profiles
    // ─────────────────────────────────────────────────────────────────────

    /// Profile for the session user.
    ///
    /// GET /api/v1/profiles/{userId}
    async fn get_profile(&self, session: &Session) -> Result<Option<UserProfile>> {
        let url = format!("{}/api/v1/profiles/{}", self.base_url, session.user_id);
        let response = self
            .client
            .get(&url)
            .headers(self.headers(session)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::parse_response(response).await?))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────────────

    /// The user's transactions, newest first (server orders by date desc).
    ///
    /// GET /api/v1/transactions?userId={userId}
    async fn get_transactions(&self, session: &Session) -> Result<Vec<Transaction>> {
        let url = format!("{}/api/v1/transactions", self.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers(session)?)
            .query(&[("userId", session.user_id.as_str())])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Create-or-replace a transaction by id.
    ///
    /// PUT /api/v1/transactions/{id}
    async fn put_transaction(&self, session: &Session, tx: &Transaction) -> Result<()> {
        let url = format!("{}/api/v1/transactions/{}", self.base_url, tx.id);
        let response = self
            .client
            .put(&url)
            .headers(self.headers(session)?)
            .json(tx)
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Delete a transaction by id; an absent id is success.
    ///
    /// DELETE /api/v1/transactions/{id}
    async fn delete_transaction_by_id(&self, session: &Session, id: &str) -> Result<()> {
        let url = format!("{}/api/v1/transactions/{}", self.base_url, id);
        let response = self
            .client
            .delete(&url)
            .headers(self.headers(session)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Delete of absent transaction {} treated as success", id);
            return Ok(());
        }
        Self::expect_success(response).await
    }
}

#[async_trait]
impl RemoteStore for RemoteClient {
    async fn fetch_session(&self) -> fintrack_core::Result<Option<Session>> {
        Ok(self.get_session().await?.map(Session::from))
    }

    async fn fetch_profile(&self, session: &Session) -> fintrack_core::Result<Option<UserProfile>> {
        Ok(self.get_profile(session).await?)
    }

    async fn list_transactions(&self, session: &Session) -> fintrack_core::Result<Vec<Transaction>> {
        Ok(self.get_transactions(session).await?)
    }

    async fn upsert_transaction(
        &self,
        session: &Session,
        tx: &Transaction,
    ) -> fintrack_core::Result<()> {
        Ok(self.put_transaction(session, tx).await?)
    }

    async fn delete_transaction(&self, session: &Session, id: &str) -> fintrack_core::Result<()> {
        Ok(self.delete_transaction_by_id(session, id).await?)
    }

    async fn sign_out(&self, session: &Session) -> fintrack_core::Result<()> {
        Ok(self.post_sign_out(session).await?)
    }
}
