//! Marketplace search endpoints.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Extension, Multipart};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::domains::marketplace::Listing;
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::extract::ApiQuery;

use super::read_form;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// `GET /api/search/marketplace?q=` - always 200; degraded paths yield the
/// fallback listing or an empty array.
pub async fn marketplace_search_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Json<Vec<Listing>> {
    Json(deps.search.search(&params.q).await)
}

/// `POST /api/search/by-image` - search by `q`, then keep listings whose image
/// matches the uploaded `file`.
pub async fn image_search_handler(
    Extension(deps): Extension<ServerDeps>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    if !deps.image_matcher.is_available() {
        return Err(ApiError::Unavailable(
            "Image matching is not available on this deployment".to_string(),
        ));
    }

    let form = read_form(multipart).await?;
    let query = form
        .field("q")
        .ok_or_else(|| ApiError::BadRequest("Missing search query 'q'".to_string()))?
        .to_string();
    let upload = form.into_file()?;

    // Reject an undecodable upload before any marketplace traffic.
    let target_hash = deps.image_matcher.hash_target(&upload.bytes).await?;

    let candidates = deps.search.search(&query).await;
    let candidate_count = candidates.len();
    let matched = deps
        .image_matcher
        .match_hash(target_hash, candidates)
        .await?;

    info!(
        query = %query,
        candidates = candidate_count,
        matched = matched.len(),
        "Image search complete"
    );
    Ok(Json(matched))
}
