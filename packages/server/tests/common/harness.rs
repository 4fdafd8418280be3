//! Test harness that drives the real router against mocked collaborators.
//!
//! Each test gets its own in-memory record store and a temporary upload
//! directory. Requests go through `tower::ServiceExt::oneshot`, so no socket
//! is bound.

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tower::ServiceExt;

use collector_core::kernel::test_dependencies::MockMarketplaceFetcher;
use collector_core::kernel::{MemoryRecordStore, TestDependencies};
use collector_core::server::build_app;

use super::{multipart_body, Part, MULTIPART_BOUNDARY};

/// Status and decoded body of one request.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let response = ctx.get("/health").await;
/// }
/// ```
pub struct TestHarness {
    router: Router,
    /// The in-memory store behind the router, for assertions.
    pub store: Arc<MemoryRecordStore>,
    /// The fetcher behind marketplace search, for asserting outbound calls.
    pub fetcher: Arc<MockMarketplaceFetcher>,
    /// Upload directory served under `/uploads`.
    pub upload_dir: TempDir,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Upload directory is removed on drop
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        Self::with_deps(TestDependencies::new()).await
    }

    /// Harness over custom mocks (canned pages, rates, image matching).
    pub async fn with_deps(deps: TestDependencies) -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let upload_dir = tempfile::tempdir().context("Failed to create upload dir")?;
        let store = deps.store.clone();
        let fetcher = deps.fetcher.clone();
        let server_deps = deps.into_server_deps(upload_dir.path()).await?;

        Ok(Self {
            router: build_app(server_deps, upload_dir.path()),
            store,
            fetcher,
            upload_dir,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn multipart(&self, method: Method, uri: &str, parts: &[Part<'_>]) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }
}
