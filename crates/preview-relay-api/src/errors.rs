//! Error types for the HTTP service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use preview_relay_core::ValidationError;

/// Webhook handler errors with HTTP status code mapping
///
/// Every terminal outcome of the preview handshake maps to exactly one of
/// these variants:
///
/// - `400 Bad Request`: client-side payload problems (malformed JSON,
///   missing required fields); no outbound call has been made
/// - `500 Internal Server Error`: upstream protocol failures and anything
///   unexpected
///
/// The response body shapes are part of the CMP-facing contract. The CMP
/// surfaces the `details` field to editors, so it echoes the upstream
/// message rather than a sanitized placeholder.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Request body was non-empty but not decodable as JSON.
    #[error("Invalid JSON payload")]
    InvalidJson,

    /// One or more of the five required payload fields were absent or empty.
    #[error("{0}")]
    MissingFields(#[from] ValidationError),

    /// The CMP rejected the acknowledge call with a non-2xx status.
    #[error("Failed to acknowledge preview")]
    AcknowledgeFailed { details: String },

    /// The CMP rejected the completion call with a non-2xx status. The
    /// acknowledge side effect has already been sent by this point.
    #[error("Failed to submit preview completion")]
    CompletionFailed { details: String },

    /// Token acquisition, transport, or any other unanticipated failure.
    #[error("Failed to process webhook")]
    Unexpected { details: String },
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidJson | Self::MissingFields(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string() }),
            ),
            Self::AcknowledgeFailed { details }
            | Self::CompletionFailed { details }
            | Self::Unexpected { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.to_string(), "details": details }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}
