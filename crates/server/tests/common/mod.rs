//! Common test utilities for API testing.
//!
//! This module provides a test fixture that builds the full router in-process
//! and drives it with `tower::ServiceExt::oneshot`, so no socket is opened.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ticketrush_core::{Config, GameConfig, ServerConfig};
use ticketrush_server::{create_router, AppState};

/// Test fixture wrapping an in-process server.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_session_creation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/sessions", json!({})).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state, for inspecting sessions directly
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 8080, // Not used for in-process testing
                max_sessions: test_config.max_sessions,
            },
            game: GameConfig {
                seed: Some(1234),
                // Only the ticket added at start shows up during a test
                spawn_delay_min_ms: 600_000,
                spawn_delay_max_ms: 600_000,
                ..Default::default()
            },
            ..Default::default()
        };

        let state = Arc::new(AppState::new(config));
        let router = create_router(Arc::clone(&state));

        Self { router, state }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Create a session and return its id.
    pub async fn create_session(&self) -> String {
        let response = self.post("/api/v1/sessions", serde_json::json!({})).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("session id")
            .to_string()
    }

    /// Create and start a session, returning its id.
    pub async fn started_session(&self) -> String {
        let id = self.create_session().await;
        let response = self.post_empty(&format!("/api/v1/sessions/{}/start", id)).await;
        assert_eq!(response.status, StatusCode::OK);
        id
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Session registry cap
    pub max_sessions: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self { max_sessions: 16 }
    }
}

impl TestConfig {
    /// Create config with a specific session cap.
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self { max_sessions }
    }
}
