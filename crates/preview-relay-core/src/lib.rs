//! # Preview-Relay Core
//!
//! Domain types for the CMP "preview with push strategy" protocol.
//!
//! This crate carries the parts of the protocol that involve no I/O:
//! - the inbound webhook payload model and its typed field extraction
//! - the preview channel set and per-channel preview URL generation
//! - the validation error shared across the workspace
//!
//! Token handling and the outbound acknowledge/complete calls live in
//! `cmp-client`; the HTTP surface lives in `preview-relay-api`.

pub mod payload;
pub mod preview_urls;

pub use payload::{PreviewRequest, PreviewWebhookPayload, REQUIRED_FIELDS};
pub use preview_urls::{generate_preview_urls, KeyedPreviews, PreviewChannel};


/// Validation failures for inbound webhook payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more of the five required payload fields are absent or empty.
    ///
    /// `missing` holds the protocol names of the fields that were actually
    /// absent, for diagnostics. The rendered message names the full required
    /// set because the CMP contract reports the complete list regardless of
    /// which subset was missing.
    #[error("Missing required fields: {}", REQUIRED_FIELDS.join(", "))]
    MissingFields { missing: Vec<&'static str> },
}
