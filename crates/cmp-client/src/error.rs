//! Error types for CMP client operations.
//!
//! Each protocol step has its own error type so the webhook handler can map
//! a failure to the HTTP response that step owes the CMP. Upstream non-2xx
//! responses keep their status code and body text; the CMP surfaces those
//! details to editors.

use thiserror::Error;

/// Token acquisition failures.
///
/// Raised by [`TokenProvider`](crate::auth::TokenProvider) implementations
/// when the authorization server is unreachable, rejects the grant, or
/// returns a payload missing the fields the cache needs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authorization server answered with a non-2xx status.
    #[error("Token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    /// A 2xx token response that lacks `access_token` or `expires_in`.
    #[error("Token response missing required field: {field}")]
    MissingTokenField { field: &'static str },

    /// A 2xx token response that could not be decoded at all.
    #[error("Token response could not be decoded: {message}")]
    MalformedTokenResponse { message: String },

    /// Transport-level failure reaching the authorization server.
    #[error("Network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Check if this error represents a transient condition that may succeed
    /// if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TokenEndpoint { status, .. } => *status >= 500 || *status == 429,
            Self::MissingTokenField { .. } => false,
            Self::MalformedTokenResponse { .. } => false,
            Self::Network(_) => true,
        }
    }
}

/// Failures constructing a [`CmpClient`](crate::client::CmpClient).
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Failed to construct HTTP client: {message}")]
    HttpClient { message: String },
}

/// Acknowledge-step failures.
///
/// `Api` is reserved for upstream non-2xx responses; token and transport
/// failures keep their own identity so callers can distinguish a protocol
/// rejection from infrastructure trouble.
#[derive(Debug, Error)]
pub enum AcknowledgeError {
    /// The CMP rejected the acknowledge call.
    #[error("CMP acknowledge call returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Token acquisition failed before the call was issued.
    #[error("Token acquisition failed: {0}")]
    Auth(#[from] AuthError),

    /// Transport-level failure reaching the CMP API.
    #[error("Network error: {0}")]
    Network(String),
}

impl AcknowledgeError {
    /// Check if this error represents a transient condition.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Auth(auth) => auth.is_transient(),
            Self::Network(_) => true,
        }
    }
}

/// Completion-step failures. Mirrors [`AcknowledgeError`]; kept separate
/// because the handler owes the CMP a different response body per step.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The CMP rejected the completion call.
    #[error("CMP completion call returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Token acquisition failed before the call was issued.
    #[error("Token acquisition failed: {0}")]
    Auth(#[from] AuthError),

    /// Transport-level failure reaching the CMP API.
    #[error("Network error: {0}")]
    Network(String),
}

impl CompletionError {
    /// Check if this error represents a transient condition.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Auth(auth) => auth.is_transient(),
            Self::Network(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
