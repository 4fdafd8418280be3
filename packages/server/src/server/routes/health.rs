use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::kernel::{ServerDeps, StoreHealth};

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
}

/// Liveness banner at `/`.
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "OPTCG Collector API running" }))
}

/// Health check endpoint
///
/// Probes the record store. Returns 200 OK when it answers, 503 Service
/// Unavailable otherwise.
pub async fn health_handler(
    Extension(deps): Extension<ServerDeps>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = deps.store.health().await;
    let is_healthy = store.is_ok();

    let (overall_status, status_code) = if is_healthy {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            store,
        }),
    )
}
