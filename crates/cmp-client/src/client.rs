//! Authenticated CMP structured-content API operations.
//!
//! The preview protocol needs exactly two outbound calls per webhook
//! delivery: acknowledge receipt, then report the generated preview URLs.
//! Both go to sibling endpoints under the same preview resource.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use preview_relay_core::KeyedPreviews;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::auth::{ClientCredentialsTokenProvider, TokenProvider};
use crate::error::{AcknowledgeError, BuildError, CompletionError};

/// Configuration for CMP client behavior.
///
/// # Examples
///
/// ```
/// use cmp_client::CmpClientConfig;
/// use std::time::Duration;
///
/// let config = CmpClientConfig::default()
///     .with_api_base_url("https://api.cmp.example.com")
///     .with_auth_base_url("https://auth.cmp.example.com")
///     .with_credentials("client-id", "client-secret")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct CmpClientConfig {
    /// CMP structured-content API base URL
    pub api_base_url: String,

    /// Authorization-server base URL for token exchange
    pub auth_base_url: String,

    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Request timeout applied to every outbound call
    pub timeout: Duration,

    /// User agent for CMP API requests
    pub user_agent: String,
}

impl Default for CmpClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            auth_base_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout: Duration::from_secs(30),
            user_agent: format!("preview-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CmpClientConfig {
    /// Set the CMP API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the authorization-server base URL.
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    /// Set the OAuth client credentials.
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Operations of the CMP preview protocol driven by the webhook handler.
///
/// Both calls are one-shot: no internal retries, and neither is idempotent
/// on the CMP side, so callers must not repeat them for the same preview
/// request.
#[async_trait]
pub trait CmpApi: Send + Sync {
    /// Confirm receipt of a preview request before generating URLs.
    async fn acknowledge_preview(
        &self,
        content_id: &str,
        version_id: &str,
        preview_id: &str,
        acknowledged_by: &str,
        content_hash: &str,
    ) -> Result<(), AcknowledgeError>;

    /// Report the generated per-channel preview URLs back to the CMP.
    async fn submit_preview_completion(
        &self,
        content_id: &str,
        version_id: &str,
        preview_id: &str,
        keyed_previews: &KeyedPreviews,
    ) -> Result<(), CompletionError>;
}

#[derive(Serialize)]
struct AcknowledgeBody<'a> {
    acknowledged_by: &'a str,
    content_hash: &'a str,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    keyed_previews: &'a KeyedPreviews,
}

/// CMP API client for authenticated preview operations.
///
/// Holds the shared HTTP client and a [`TokenProvider`]; each operation
/// asks the provider for a token (served from cache when fresh) and issues
/// a single bearer-authenticated POST.
#[derive(Clone)]
pub struct CmpClient {
    http: reqwest::Client,
    api_base_url: String,
    auth: Arc<dyn TokenProvider>,
}

impl CmpClient {
    /// Construct a client and its token provider from configuration.
    ///
    /// Validates both base URLs up front so a misconfigured deployment
    /// fails at startup rather than on the first webhook.
    pub fn new(config: CmpClientConfig) -> Result<Self, BuildError> {
        for url in [&config.api_base_url, &config.auth_base_url] {
            Url::parse(url).map_err(|e| BuildError::InvalidBaseUrl {
                url: url.clone(),
                message: e.to_string(),
            })?;
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| BuildError::HttpClient {
                message: e.to_string(),
            })?;

        let auth = Arc::new(ClientCredentialsTokenProvider::new(
            http.clone(),
            &config.auth_base_url,
            &config.client_id,
            &config.client_secret,
        ));

        Ok(Self::with_token_provider(http, config.api_base_url, auth))
    }

    /// Construct a client around an existing token provider.
    ///
    /// Used by tests to inject canned tokens; `new` is the production path.
    pub fn with_token_provider(
        http: reqwest::Client,
        api_base_url: impl Into<String>,
        auth: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into(),
            auth,
        }
    }

    /// Build the URL for a preview sub-resource action.
    fn preview_action_url(
        &self,
        content_id: &str,
        version_id: &str,
        preview_id: &str,
        action: &str,
    ) -> String {
        format!(
            "{}/v3/structured-content/contents/{}/versions/{}/previews/{}/{}",
            self.api_base_url.trim_end_matches('/'),
            content_id,
            version_id,
            preview_id,
            action
        )
    }
}

impl std::fmt::Debug for CmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmpClient")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[async_trait]
impl CmpApi for CmpClient {
    #[instrument(skip(self, acknowledged_by, content_hash))]
    async fn acknowledge_preview(
        &self,
        content_id: &str,
        version_id: &str,
        preview_id: &str,
        acknowledged_by: &str,
        content_hash: &str,
    ) -> Result<(), AcknowledgeError> {
        let token = self.auth.access_token().await?;
        let url = self.preview_action_url(content_id, version_id, preview_id, "acknowledge");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&AcknowledgeBody {
                acknowledged_by,
                content_hash,
            })
            .send()
            .await
            .map_err(|e| AcknowledgeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AcknowledgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(preview_id = %preview_id, "Acknowledged preview request");
        Ok(())
    }

    #[instrument(skip(self, keyed_previews))]
    async fn submit_preview_completion(
        &self,
        content_id: &str,
        version_id: &str,
        preview_id: &str,
        keyed_previews: &KeyedPreviews,
    ) -> Result<(), CompletionError> {
        let token = self.auth.access_token().await?;
        let url = self.preview_action_url(content_id, version_id, preview_id, "complete");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&CompletionBody { keyed_previews })
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(preview_id = %preview_id, "Submitted preview completion");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
