//! Client-credentials token provider with a single-entry cache.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{TokenCacheEntry, TokenProvider, EXPIRY_MARGIN_SECONDS};
use crate::error::AuthError;

/// Token endpoint path on the CMP authorization server.
const TOKEN_PATH: &str = "/o/oauth2/v1/token";

/// OAuth2 `client_credentials` token provider.
///
/// Keeps the most recent token in a single slot guarded by an async mutex.
/// The lock is held across the whole check-fetch-store sequence, so
/// concurrent callers that observe a stale entry coalesce on one fetch
/// instead of issuing duplicates.
pub struct ClientCredentialsTokenProvider {
    http: reqwest::Client,
    auth_base_url: String,
    client_id: String,
    client_secret: String,
    cache: Mutex<Option<TokenCacheEntry>>,
}

/// Wire shape of the token endpoint response.
///
/// Both fields are optional so a malformed 2xx body is reported by field
/// name rather than as an opaque decode failure.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

impl ClientCredentialsTokenProvider {
    /// Create a provider with an empty cache.
    ///
    /// `http` is shared with the API client so both reuse one connection
    /// pool and carry the same timeout.
    pub fn new(
        http: reqwest::Client,
        auth_base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth_base_url: auth_base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache: Mutex::new(None),
        }
    }

    /// Fetch a fresh token from the authorization server.
    #[instrument(skip(self))]
    async fn fetch_token(&self) -> Result<TokenCacheEntry, AuthError> {
        let url = format!("{}{}", self.auth_base_url.trim_end_matches('/'), TOKEN_PATH);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedTokenResponse {
                message: e.to_string(),
            })?;

        let access_token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingTokenField {
                field: "access_token",
            })?;
        let expires_in = parsed.expires_in.ok_or(AuthError::MissingTokenField {
            field: "expires_in",
        })?;

        let expires_at = Utc::now() + Duration::seconds(expires_in - EXPIRY_MARGIN_SECONDS);

        Ok(TokenCacheEntry {
            access_token,
            expires_at,
        })
    }
}

impl std::fmt::Debug for ClientCredentialsTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsTokenProvider")
            .field("auth_base_url", &self.auth_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn access_token(&self) -> Result<String, AuthError> {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.as_ref() {
            if entry.is_fresh(Utc::now()) {
                debug!("Serving CMP access token from cache");
                return Ok(entry.access_token.clone());
            }
        }

        let entry = self.fetch_token().await?;
        debug!(expires_at = %entry.expires_at, "Fetched new CMP access token");

        let token = entry.access_token.clone();
        *cache = Some(entry);
        Ok(token)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
