//! # CMP Client
//!
//! Outbound client for the CMP "preview with push strategy" protocol.
//!
//! Two concerns live here:
//! - [`auth`]: OAuth2 client-credentials token acquisition with a
//!   single-entry cache and an early-refresh margin
//! - [`client`]: the authenticated acknowledge / complete calls against the
//!   CMP structured-content API
//!
//! Both CMP calls are one-shot and non-retrying; sequencing (acknowledge
//! before complete, at most once each per preview request) is owned by the
//! webhook handler in `preview-relay-api`.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{ClientCredentialsTokenProvider, TokenCacheEntry, TokenProvider};
pub use client::{CmpApi, CmpClient, CmpClientConfig};
pub use error::{AcknowledgeError, AuthError, BuildError, CompletionError};
