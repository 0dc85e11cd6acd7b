//! Common test utilities for preview-relay integration tests
//!
//! This module provides:
//! - an app builder wiring a real `CmpClient` (with its real token
//!   provider) to a wiremock CMP
//! - mock mounters for the token, acknowledge, and complete endpoints
//! - the sample webhook payload used across flows

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cmp_client::{CmpClient, CmpClientConfig};
use preview_relay_api::{create_router, AppState, ServiceConfig};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const PREVIEW_BASE_URL: &str = "https://preview.example.com";
#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "integration-test-token";

/// Build a router backed by a real `CmpClient` pointed at `cmp_server`.
///
/// Both the authorization server and the structured-content API are played
/// by the same wiremock instance; the paths do not overlap.
#[allow(dead_code)]
pub fn build_app(cmp_server: &MockServer) -> Router {
    let mut config = ServiceConfig::default();
    config.cmp.api_base_url = cmp_server.uri();
    config.cmp.auth_base_url = cmp_server.uri();
    config.cmp.client_id = "test-client".to_string();
    config.cmp.client_secret = "test-secret".to_string();
    config.preview.base_url = PREVIEW_BASE_URL.to_string();

    let client_config = CmpClientConfig::default()
        .with_api_base_url(&config.cmp.api_base_url)
        .with_auth_base_url(&config.cmp.auth_base_url)
        .with_credentials(&config.cmp.client_id, &config.cmp.client_secret)
        .with_timeout(Duration::from_secs(5));

    let cmp = Arc::new(CmpClient::new(client_config).expect("CMP client construction"));

    create_router(AppState::new(config, cmp))
}

/// Mount a token endpoint answering with [`ACCESS_TOKEN`], expecting exactly
/// `expected_calls` grant requests.
#[allow(dead_code)]
pub async fn mount_token_endpoint(server: &MockServer, expires_in: i64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/o/oauth2/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": expires_in,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount the acknowledge endpoint for preview `p1` of content `c1`.
#[allow(dead_code)]
pub async fn mount_acknowledge_endpoint(
    server: &MockServer,
    status: u16,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path(
            "/v3/structured-content/contents/c1/versions/v1/previews/p1/acknowledge",
        ))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount the complete endpoint for preview `p1` of content `c1`.
#[allow(dead_code)]
pub async fn mount_complete_endpoint(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(
            "/v3/structured-content/contents/c1/versions/v1/previews/p1/complete",
        ))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// The documented end-to-end example payload.
#[allow(dead_code)]
pub fn sample_payload() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "preview_id": "p1",
            "assets": {
                "structured_contents": [{
                    "id": "c1",
                    "version_id": "v1",
                    "content_body": {
                        "updated_by": "alice",
                        "fields_version": { "content_hash": "h1" }
                    }
                }]
            }
        }
    })
}

/// POST a webhook body and decode the JSON response.
#[allow(dead_code)]
pub async fn post_webhook(app: Router, body: String) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cmp-preview-webhook")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = serde_json::from_slice(&bytes).expect("body is JSON");

    (status, json)
}
