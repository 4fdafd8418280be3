//! Application setup and server configuration.

use std::path::Path;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::kernel::{ServerDeps, UPLOADS_ROUTE};
use crate::server::routes::{
    add_to_collection_handler, health_handler, image_search_handler, list_collection_handler,
    marketplace_search_handler, rate_handler, root_handler, set_custom_image_handler,
    upload_image_handler,
};

/// Largest accepted request body (image uploads).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the Axum application router
///
/// `upload_dir` is served read-only under `/uploads`; it must be the same
/// directory the upload sink in `deps` writes to.
pub fn build_app(deps: ServerDeps, upload_dir: impl AsRef<Path>) -> Router {
    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/search/marketplace", get(marketplace_search_handler))
        .route("/api/search/by-image", post(image_search_handler))
        .route("/api/rate", get(rate_handler))
        .route("/api/upload-image", post(upload_image_handler))
        .route(
            "/api/collection",
            get(list_collection_handler).post(add_to_collection_handler),
        )
        .route("/api/collection/:id/image", put(set_custom_image_handler))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(upload_dir.as_ref()))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(deps))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
