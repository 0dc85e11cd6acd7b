//! # Preview-Relay HTTP Service
//!
//! HTTP surface for the CMP preview webhook integration.
//!
//! This crate provides:
//! - the `POST /cmp-preview-webhook` handler implementing the
//!   acknowledge → generate → complete protocol sequence
//! - health and readiness endpoints
//! - the service configuration model and handler error mapping
//!
//! Configuration loading and dependency wiring live in the service binary;
//! this crate only puts handlers onto a router.

pub mod config;
pub mod errors;
pub mod responses;




use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use chrono::Utc;
use cmp_client::{AcknowledgeError, CmpApi, CompletionError};
use preview_relay_core::{generate_preview_urls, PreviewRequest, PreviewWebhookPayload};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

pub use config::{CmpSettings, LoggingConfig, PreviewSettings, ServerConfig, ServiceConfig};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};
pub use responses::{HealthResponse, PreviewWebhookResponse, ReadinessResponse};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Client for the CMP acknowledge / complete calls
    pub cmp: Arc<dyn CmpApi>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServiceConfig, cmp: Arc<dyn CmpApi>) -> Self {
        Self { config, cmp }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes =
        Router::new().route("/cmp-preview-webhook", post(handle_preview_webhook));

    let health_routes = Router::new()
        .route("/health", get(handle_health_check))
        .route("/ready", get(handle_readiness_check));

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logging_middleware))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
pub async fn start_server(config: ServiceConfig, cmp: Arc<dyn CmpApi>) -> Result<(), ServiceError> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_timeout =
        std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);

    let state = AppState::new(config, cmp);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    // In-flight requests are allowed to complete; new connections are
    // refused as soon as the shutdown signal fires.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Handle CMP preview webhook requests
///
/// Implements the push-strategy preview handshake:
/// 1. Decode the payload and extract the five required identifiers
/// 2. Acknowledge the preview request against the CMP
/// 3. Generate the per-channel preview URLs
/// 4. Report the URLs back via the completion call
///
/// Each step suspends until the previous one finished; the first failure
/// produces the terminal response. No step is retried, and every request
/// issues at most one acknowledge and one completion call.
#[instrument(skip(state, body))]
pub async fn handle_preview_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PreviewWebhookResponse>, WebhookHandlerError> {
    // Received -> Parsed. The body is read as raw bytes; an empty body is
    // treated as an empty payload so the missing-field gate reports it.
    let payload = parse_payload(&body)?;

    // Parsed -> Validated
    let request = PreviewRequest::from_payload(&payload).map_err(|e| {
        let preview_relay_core::ValidationError::MissingFields { ref missing } = e;
        warn!(
            missing = ?missing,
            "Rejecting preview webhook; required fields absent"
        );
        WebhookHandlerError::MissingFields(e)
    })?;

    info!(
        content_id = %request.content_id,
        version_id = %request.version_id,
        preview_id = %request.preview_id,
        updated_by = %request.updated_by,
        "Received preview request"
    );

    // Validated -> Acknowledged
    if let Err(e) = state
        .cmp
        .acknowledge_preview(
            &request.content_id,
            &request.version_id,
            &request.preview_id,
            &request.updated_by,
            &request.content_hash,
        )
        .await
    {
        error!(
            content_id = %request.content_id,
            preview_id = %request.preview_id,
            error = %e,
            "Failed to acknowledge preview request"
        );
        return Err(match e {
            AcknowledgeError::Api { .. } => WebhookHandlerError::AcknowledgeFailed {
                details: e.to_string(),
            },
            other => WebhookHandlerError::Unexpected {
                details: other.to_string(),
            },
        });
    }

    // Acknowledged -> UrlsGenerated. Pure, infallible.
    let keyed_previews =
        generate_preview_urls(&state.config.preview.base_url, &request.content_id);

    // UrlsGenerated -> Completed
    if let Err(e) = state
        .cmp
        .submit_preview_completion(
            &request.content_id,
            &request.version_id,
            &request.preview_id,
            &keyed_previews,
        )
        .await
    {
        // The acknowledge side effect has already been sent: the CMP now
        // holds a preview that will never complete. Operators reconcile via
        // CMP tooling, so this line must carry both identifiers.
        error!(
            content_id = %request.content_id,
            preview_id = %request.preview_id,
            error = %e,
            "Failed to submit preview completion after acknowledge"
        );
        return Err(match e {
            CompletionError::Api { .. } => WebhookHandlerError::CompletionFailed {
                details: e.to_string(),
            },
            other => WebhookHandlerError::Unexpected {
                details: other.to_string(),
            },
        });
    }

    info!(
        content_id = %request.content_id,
        preview_id = %request.preview_id,
        "Preview request acknowledged and completed"
    );

    Ok(Json(PreviewWebhookResponse {
        message: "Preview webhook processed successfully".to_string(),
        acknowledged: true,
        completed: true,
        content_id: request.content_id,
        version_id: request.version_id,
        preview_id: request.preview_id,
        keyed_previews,
    }))
}

/// Decode the raw request body into the payload model.
///
/// Malformed JSON never falls back to plain-text handling; it is a terminal
/// 400 before any outbound call.
fn parse_payload(body: &[u8]) -> Result<PreviewWebhookPayload, WebhookHandlerError> {
    if body.is_empty() {
        return Ok(PreviewWebhookPayload::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "Webhook body is not valid JSON");
        WebhookHandlerError::InvalidJson
    })
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Basic liveness check
#[instrument]
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness check for orchestrators
#[instrument]
async fn handle_readiness_check() -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        ready: true,
        timestamp: Utc::now(),
    })
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware with correlation ID tracking
///
/// Extracts or generates a correlation ID, logs request start and
/// completion with structured fields, and propagates the ID through the
/// response headers.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());

    info!(
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
        "Request started"
    );

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();

    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}
