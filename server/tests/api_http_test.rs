//! HTTP tests for the archive routes against a mocked upstream API.
//!
//! Requests go through the full axum router with `tower::ServiceExt::oneshot`;
//! upstream calls are answered by a local `wiremock` server.

use std::path::Path;

use archive_server::api::{create_router, AppState};
use archive_server::config::Config;
use archive_server::directory::HttpDirectoryClient;
use archive_server::ratelimit::{LimitConfig, RateLimitConfig, RateLimiter};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "user-token";

/// Upstream with one guild (1000), user 1 holding role 10.
///
/// Channel 101 hides from @everyone but allows role 10; channel 102 hides
/// from @everyone only.
async fn mock_upstream() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("Authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "username": "alice",
            "avatar": null
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "401: Unauthorized"})))
        .with_priority(10)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guilds/1000/members/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "roles": ["10"] })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guilds/1000/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1000", "name": "@everyone", "permissions": "0" },
            { "id": "10", "name": "member", "permissions": "0" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guilds/1000/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "101",
                "guild_id": "1000",
                "name": "archive",
                "type": 0,
                "permission_overwrites": [
                    { "id": "1000", "type": 0, "allow": "0", "deny": "1024" },
                    { "id": "10", "type": 0, "allow": "1024", "deny": "0" }
                ]
            },
            {
                "id": "102",
                "guild_id": "1000",
                "name": "staff",
                "type": 0,
                "permission_overwrites": [
                    { "id": "1000", "type": 0, "allow": "0", "deny": "1024" }
                ]
            }
        ])))
        .mount(&server)
        .await;

    // Guild 2000: member lookup is broken upstream.
    Mock::given(method("GET"))
        .and(path("/guilds/2000/members/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guilds/2000/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guilds/2000/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    server
}

fn build_app(upstream: &MockServer, log_path: &Path, max_refreshes: u32) -> Router {
    let config = Config::default_for_test(&upstream.uri());
    let directory = HttpDirectoryClient::new(&config.upstream_api_base, config.upstream_timeout)
        .expect("http client");
    let rate_limiter = RateLimiter::new(RateLimitConfig {
        enabled: true,
        log_path: log_path.to_path_buf(),
        refresh: LimitConfig {
            requests: max_refreshes,
            window_secs: 3600,
        },
    });
    create_router(AppState::new(config, directory, rate_limiter))
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rate_limiting"], true);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    let (status, body) = send(&app, Method::GET, "/api/guilds/1000/channels/accessible", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing_auth");
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/guilds/1000/channels/accessible",
        Some("stolen-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_lists_accessible_channels() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/guilds/1000/channels/accessible",
        Some(TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "guild_id": "1000", "channels": ["101"] }));
}

#[tokio::test]
async fn test_single_channel_access() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/guilds/1000/channels/101/access",
        Some(TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/guilds/1000/channels/102/access",
        Some(TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
}

#[tokio::test]
async fn test_upstream_failure_fails_closed() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/guilds/2000/channels/5/access",
        Some(TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_unavailable");
    assert!(body.get("allowed").is_none());
}

#[tokio::test]
async fn test_refresh_is_rate_limited() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 2);
    let uri = "/api/guilds/1000/channels/101/refresh";

    let (status, body) = send(&app, Method::POST, uri, Some(TOKEN)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({ "accepted": true, "remaining": 1 }));

    let (status, _) = send(&app, Method::POST, uri, Some(TOKEN)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, body) = send(&app, Method::POST, uri, Some(TOKEN)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
    assert_eq!(body["limit"], 2);
    assert!(body["retry_after"].as_u64().unwrap() > 3500);
}

#[tokio::test]
async fn test_refresh_requires_channel_access() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("rl.json");
    let app = build_app(&upstream, &log_path, 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/guilds/1000/channels/102/refresh",
        Some(TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Refused refreshes do not consume the budget.
    assert!(!log_path.exists());
}

async fn profile_lookups(upstream: &MockServer) -> usize {
    upstream
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/users/@me")
        .count()
}

#[tokio::test]
async fn test_verified_token_is_reused() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);

    for uri in [
        "/api/guilds/1000/channels/accessible",
        "/api/guilds/1000/channels/101/access",
        "/api/guilds/1000/channels/102/access",
    ] {
        let (status, _) = send(&app, Method::GET, uri, Some(TOKEN)).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(profile_lookups(&upstream).await, 1);
}

#[tokio::test]
async fn test_rejected_token_is_not_remembered() {
    let upstream = mock_upstream().await;
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(&upstream, &dir.path().join("rl.json"), 3);
    let uri = "/api/guilds/1000/channels/accessible";

    for _ in 0..2 {
        let (status, _) = send(&app, Method::GET, uri, Some("stolen-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    assert_eq!(profile_lookups(&upstream).await, 2);
}
