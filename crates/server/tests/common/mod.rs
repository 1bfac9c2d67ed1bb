//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock collaborators injected into a real orchestrator, enabling API
//! tests without network access or an encoder.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use vodpipe_core::{
    fetcher::{FetcherConfig, SegmentFetcher},
    testing::{MockConverter, MockResolver, MockTransport},
    Config, JobOrchestrator, OrchestratorConfig, Pipeline,
};
use vodpipe_server::state::AppState;

/// Re-export fixtures for test convenience
pub use vodpipe_core::testing::fixtures;

/// Test fixture for E2E testing with mock collaborators.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_job_creation() {
///     let fixture = TestFixture::new().await;
///     fixture.serve_video("v1", 3);
///
///     let response = fixture.post("/api/v1/jobs", fixture.job_body("v1")).await;
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Orchestrator behind the router
    pub orchestrator: Arc<JobOrchestrator>,
    /// Mock playlist resolver - serves manifests, can be held
    pub resolver: Arc<MockResolver>,
    /// Mock segment transport - serves segment bodies
    pub transport: Arc<MockTransport>,
    /// Mock converter - copies input to output
    pub converter: Arc<MockConverter>,
    /// Temporary directory for per-job temp dirs
    pub temp_dir: TempDir,
    /// Output directory for finished videos
    pub output_dir: PathBuf,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Run the scheduler loop (otherwise jobs stay queued)
    pub start_scheduler: bool,
    /// Drop finished jobs from the list
    pub remove_completed: bool,
}

impl TestConfig {
    /// Create config with the scheduler running.
    pub fn with_scheduler() -> Self {
        Self {
            start_scheduler: true,
            remove_completed: false,
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with the scheduler stopped.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_dir = temp_dir.path().join("output");
        std::fs::create_dir_all(&output_dir).expect("Failed to create output dir");

        // Create mocks
        let resolver = Arc::new(MockResolver::new());
        let transport = Arc::new(MockTransport::new());
        let converter = Arc::new(MockConverter::new());

        let mut config = Config::default();
        config.downloader.temp_dir = temp_dir.path().join("tmp");
        config.orchestrator = OrchestratorConfig::default()
            .with_tick_interval_ms(10)
            .with_remove_completed(test_config.remove_completed);
        config.resolver.client_id = "test-client-id".to_string();

        let fetcher = SegmentFetcher::new(
            transport.clone(),
            FetcherConfig::default().with_retry_delay(Duration::from_millis(5)),
        );
        let pipeline = Pipeline::new(
            resolver.clone(),
            fetcher,
            converter.clone(),
            config.downloader.temp_dir.clone(),
        );
        let orchestrator = Arc::new(JobOrchestrator::new(config.orchestrator.clone(), pipeline));
        if test_config.start_scheduler {
            orchestrator.start();
        }

        let state = Arc::new(AppState::new(config, Arc::clone(&orchestrator)));
        let router = vodpipe_server::api::create_router(state);

        Self {
            router,
            orchestrator,
            resolver,
            transport,
            converter,
            temp_dir,
            output_dir,
        }
    }

    /// Serve a manifest with `segments` segments for `video_id`.
    pub fn serve_video(&self, video_id: &str, segments: usize) {
        self.resolver
            .set_manifest(video_id, "chunked", fixtures::manifest(segments, 10.0));
        fixtures::serve_segments(
            &self.transport,
            &self.resolver.playlist_url(video_id, "chunked"),
            segments,
        );
    }

    /// JSON body for `POST /api/v1/jobs` writing into the output directory.
    pub fn job_body(&self, video_id: &str) -> Value {
        json!({
            "video": {
                "id": video_id,
                "url": format!("https://example.com/videos/{}", video_id),
                "length_secs": 30.0
            },
            "quality": { "id": "chunked", "display_name": "Source" },
            "auth": { "token": "token", "signature": "sig" },
            "folder": self.output_dir,
            "filename": format!("{}.mp4", video_id)
        })
    }

    /// Create a job through the API and return its id.
    pub async fn create_job(&self, video_id: &str) -> String {
        let response = self.post("/api/v1/jobs", self.job_body(video_id)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"]
            .as_str()
            .expect("missing job id")
            .to_string()
    }

    /// Poll `GET /api/v1/jobs/{id}` until the job reaches `state`.
    pub async fn wait_for_state(&self, id: &str, state: &str) -> Value {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let response = self.get(&format!("/api/v1/jobs/{}", id)).await;
            if response.body["state"] == state {
                return response.body;
            }
            assert!(
                Instant::now() < deadline,
                "job {} never reached {}; last: {}",
                id,
                state,
                response.body
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
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

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        TestResponse {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
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

        let (status, body_bytes) = self.send(request_builder.body(body).unwrap()).await;

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
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

        (status, body_bytes.to_vec())
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
