//! OAuth2 client-credentials authentication for the CMP API.
//!
//! The CMP authorization server issues short-lived bearer tokens against a
//! `client_credentials` grant. Tokens are interchangeable, so the provider
//! keeps exactly one cached entry and every authenticated call asks for a
//! token immediately before use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AuthError;

mod provider;

pub use provider::ClientCredentialsTokenProvider;

/// Seconds subtracted from the advertised token lifetime before caching.
///
/// Guards against a token expiring while a request carrying it is still in
/// flight. A token whose `expires_in` is at or below this margin produces an
/// already-expired cache entry; the next call fetches again instead of
/// failing here.
pub const EXPIRY_MARGIN_SECONDS: i64 = 300;

/// Source of bearer tokens for authenticated CMP calls.
///
/// Implementations may cache. Callers request a token before every outbound
/// call and must not hold one across calls; freshness is the provider's
/// concern, not the caller's.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a bearer token that is valid now.
    async fn access_token(&self) -> Result<String, AuthError>;
}

/// A cached bearer token with its refresh deadline.
#[derive(Debug, Clone)]
pub struct TokenCacheEntry {
    pub access_token: String,

    /// Real expiry minus [`EXPIRY_MARGIN_SECONDS`].
    pub expires_at: DateTime<Utc>,
}

impl TokenCacheEntry {
    /// Whether the cached token can still be served.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
