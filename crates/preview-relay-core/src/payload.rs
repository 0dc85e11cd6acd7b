//! Inbound CMP webhook payload model and field extraction.
//!
//! The CMP delivers preview notifications as a nested JSON document. The
//! identifiers this service needs sit several levels deep:
//!
//! ```text
//! data.preview_id
//! data.assets.structured_contents[0].id
//! data.assets.structured_contents[0].version_id
//! data.assets.structured_contents[0].content_body.updated_by
//! data.assets.structured_contents[0].content_body.fields_version.content_hash
//! ```
//!
//! Every leaf in the model is optional so that a partial delivery still
//! decodes cleanly; [`PreviewRequest::from_payload`] is the single place
//! that decides whether a delivery is complete, and it records exactly which
//! fields were absent. Partial payloads are rejected, never repaired or
//! defaulted.

use serde::Deserialize;

use crate::ValidationError;

/// Protocol names of the five required fields, in reporting order.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "contentId",
    "versionId",
    "previewId",
    "updatedBy",
    "contentHash",
];

/// Decoded webhook body. One delivery maps to exactly one content item,
/// one version, and one preview request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewWebhookPayload {
    pub data: Option<PayloadData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadData {
    pub preview_id: Option<String>,
    pub assets: Option<PayloadAssets>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadAssets {
    #[serde(default)]
    pub structured_contents: Vec<StructuredContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredContent {
    pub id: Option<String>,
    pub version_id: Option<String>,
    pub content_body: Option<ContentBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentBody {
    pub updated_by: Option<String>,
    pub fields_version: Option<FieldsVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldsVersion {
    pub content_hash: Option<String>,
}

/// A fully validated preview request.
///
/// All five identifiers are guaranteed non-empty; construction goes through
/// [`PreviewRequest::from_payload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub content_id: String,
    pub version_id: String,
    pub preview_id: String,
    pub updated_by: String,
    pub content_hash: String,
}

impl PreviewRequest {
    /// Extract the five required fields from a decoded payload.
    ///
    /// An absent intermediate object, an empty `structured_contents` array,
    /// a missing leaf, and an empty string all count as missing. All missing
    /// fields are collected before failing so callers can log the complete
    /// set.
    pub fn from_payload(payload: &PreviewWebhookPayload) -> Result<Self, ValidationError> {
        let data = payload.data.as_ref();
        let content = data
            .and_then(|d| d.assets.as_ref())
            .and_then(|a| a.structured_contents.first());
        let content_body = content.and_then(|c| c.content_body.as_ref());

        let content_id = content.and_then(|c| non_empty(c.id.as_deref()));
        let version_id = content.and_then(|c| non_empty(c.version_id.as_deref()));
        let preview_id = data.and_then(|d| non_empty(d.preview_id.as_deref()));
        let updated_by = content_body.and_then(|b| non_empty(b.updated_by.as_deref()));
        let content_hash = content_body
            .and_then(|b| b.fields_version.as_ref())
            .and_then(|f| non_empty(f.content_hash.as_deref()));

        match (content_id, version_id, preview_id, updated_by, content_hash) {
            (
                Some(content_id),
                Some(version_id),
                Some(preview_id),
                Some(updated_by),
                Some(content_hash),
            ) => Ok(Self {
                content_id: content_id.to_string(),
                version_id: version_id.to_string(),
                preview_id: preview_id.to_string(),
                updated_by: updated_by.to_string(),
                content_hash: content_hash.to_string(),
            }),
            (content_id, version_id, preview_id, updated_by, content_hash) => {
                let mut missing = Vec::new();
                if content_id.is_none() {
                    missing.push(REQUIRED_FIELDS[0]);
                }
                if version_id.is_none() {
                    missing.push(REQUIRED_FIELDS[1]);
                }
                if preview_id.is_none() {
                    missing.push(REQUIRED_FIELDS[2]);
                }
                if updated_by.is_none() {
                    missing.push(REQUIRED_FIELDS[3]);
                }
                if content_hash.is_none() {
                    missing.push(REQUIRED_FIELDS[4]);
                }
                Err(ValidationError::MissingFields { missing })
            }
        }
    }
}

/// Treat empty strings the same as absent fields.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
