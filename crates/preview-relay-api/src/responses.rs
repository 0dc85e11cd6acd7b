//! Response body types for the HTTP service

use chrono::{DateTime, Utc};
use preview_relay_core::KeyedPreviews;
use serde::{Deserialize, Serialize};

/// Success body for a fully processed preview webhook.
///
/// Field names are part of the CMP-facing contract and therefore camelCase
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewWebhookResponse {
    pub message: String,
    pub acknowledged: bool,
    pub completed: bool,
    pub content_id: String,
    pub version_id: String,
    pub preview_id: String,
    pub keyed_previews: KeyedPreviews,
}

/// Basic health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub timestamp: DateTime<Utc>,
}
