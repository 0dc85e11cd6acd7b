//! Tests for [`ClientCredentialsTokenProvider`].
//!
//! Uses a wiremock authorization server; call-count expectations are
//! verified when the `MockServer` is dropped.

use super::*;
use chrono::Utc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn provider_for(server: &MockServer) -> ClientCredentialsTokenProvider {
    ClientCredentialsTokenProvider::new(
        reqwest::Client::new(),
        server.uri(),
        "test-client",
        "test-secret",
    )
}

/// Mount a token endpoint answering with `token` and `expires_in`, expecting
/// exactly `expected_calls` requests.
async fn mount_token_endpoint(
    server: &MockServer,
    token: &str,
    expires_in: i64,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/o/oauth2/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "expires_in": expires_in,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ============================================================================
// Grant request tests
// ============================================================================

mod grant_request_tests {
    use super::*;

    /// The grant is form-encoded with client credentials and the
    /// `client_credentials` grant type.
    #[tokio::test]
    async fn test_grant_request_is_form_encoded_client_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/o/oauth2/v1/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=test-client"))
            .and(body_string_contains("client_secret=test-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok-1",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let token = provider.access_token().await.expect("token fetch succeeds");

        assert_eq!(token, "tok-1");
    }

    /// A trailing slash on the configured base URL does not break the path.
    #[tokio::test]
    async fn test_base_url_trailing_slash_is_tolerated() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "tok-1", 3600, 1).await;

        let provider = ClientCredentialsTokenProvider::new(
            reqwest::Client::new(),
            format!("{}/", server.uri()),
            "test-client",
            "test-secret",
        );

        assert!(provider.access_token().await.is_ok());
    }
}

// ============================================================================
// Cache behavior tests
// ============================================================================

mod cache_tests {
    use super::*;

    /// A fresh cached token is served without any network call: two
    /// back-to-back requests hit the endpoint exactly once.
    #[tokio::test]
    async fn test_fresh_cache_entry_serves_without_fetch() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "tok-1", 3600, 1).await;

        let provider = provider_for(&server);

        let first = provider.access_token().await.expect("first fetch");
        let second = provider.access_token().await.expect("cache hit");

        assert_eq!(first, "tok-1");
        assert_eq!(second, "tok-1");
    }

    /// A successful fetch stores `expires_at = now + (expires_in - 300) s`.
    #[tokio::test]
    async fn test_expiry_carries_refresh_margin() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "tok-1", 3600, 1).await;

        let provider = provider_for(&server);
        let before = Utc::now();
        provider.access_token().await.expect("token fetch");
        let after = Utc::now();

        let cache = provider.cache.lock().await;
        let entry = cache.as_ref().expect("cache populated");

        let margin = chrono::Duration::seconds(3600 - EXPIRY_MARGIN_SECONDS);
        assert!(entry.expires_at >= before + margin);
        assert!(entry.expires_at <= after + margin);
    }

    /// An expired cache entry triggers a fresh fetch and is overwritten.
    #[tokio::test]
    async fn test_expired_entry_is_refetched_and_overwritten() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "tok-2", 3600, 1).await;

        let provider = provider_for(&server);
        {
            let mut cache = provider.cache.lock().await;
            *cache = Some(TokenCacheEntry {
                access_token: "stale".to_string(),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            });
        }

        let token = provider.access_token().await.expect("refetch");

        assert_eq!(token, "tok-2");
        let cache = provider.cache.lock().await;
        assert_eq!(
            cache.as_ref().expect("cache populated").access_token,
            "tok-2"
        );
    }

    /// `expires_in` at the margin yields an already-expired entry: usable
    /// for this call, refetched on the next one. Degraded, not an error.
    #[tokio::test]
    async fn test_short_lived_token_forces_refetch_on_next_use() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "tok-short", 300, 2).await;

        let provider = provider_for(&server);

        assert_eq!(provider.access_token().await.expect("first"), "tok-short");
        assert_eq!(provider.access_token().await.expect("second"), "tok-short");
    }
}

// ============================================================================
// Failure tests
// ============================================================================

mod failure_tests {
    use super::*;

    /// A non-2xx answer surfaces the status and body and leaves the cache
    /// empty.
    #[tokio::test]
    async fn test_error_status_is_reported_with_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/o/oauth2/v1/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let error = provider.access_token().await.expect_err("must fail");

        match error {
            AuthError::TokenEndpoint { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected TokenEndpoint, got {:?}", other),
        }
        assert!(provider.cache.lock().await.is_none());
    }

    /// A 2xx body without `access_token` is rejected by field name.
    #[tokio::test]
    async fn test_missing_access_token_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/o/oauth2/v1/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "expires_in": 3600 })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let error = provider.access_token().await.expect_err("must fail");

        assert!(matches!(
            error,
            AuthError::MissingTokenField {
                field: "access_token"
            }
        ));
    }

    /// A 2xx body without `expires_in` is rejected by field name.
    #[tokio::test]
    async fn test_missing_expires_in_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/o/oauth2/v1/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "tok-1" })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let error = provider.access_token().await.expect_err("must fail");

        assert!(matches!(
            error,
            AuthError::MissingTokenField { field: "expires_in" }
        ));
    }

    /// A 2xx body that is not JSON at all is a malformed response.
    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/o/oauth2/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let error = provider.access_token().await.expect_err("must fail");

        assert!(matches!(error, AuthError::MalformedTokenResponse { .. }));
    }

    /// The Debug representation never reveals the client secret.
    #[test]
    fn test_debug_redacts_client_secret() {
        let provider = ClientCredentialsTokenProvider::new(
            reqwest::Client::new(),
            "https://auth.example.com",
            "test-client",
            "top-secret-value",
        );

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("top-secret-value"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
