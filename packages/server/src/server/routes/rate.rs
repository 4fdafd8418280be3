use axum::extract::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::extract::ApiQuery;

#[derive(Debug, Deserialize)]
pub struct RateParams {
    #[serde(default = "default_from")]
    pub frm: String,
    #[serde(default = "default_to")]
    pub to: String,
}

fn default_from() -> String {
    "USD".to_string()
}

fn default_to() -> String {
    "EUR".to_string()
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

/// `GET /api/rate?frm=&to=` - passthrough to the exchange-rate API.
pub async fn rate_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiQuery(params): ApiQuery<RateParams>,
) -> Result<Json<RateResponse>, ApiError> {
    let from = params.frm.trim().to_uppercase();
    let to = params.to.trim().to_uppercase();

    let rate = deps.rates.rate(&from, &to).await.map_err(|e| {
        warn!(from = %from, to = %to, error = %e, "Rate lookup failed");
        ApiError::BadGateway(format!("Failed to fetch rate: {}", e))
    })?;

    Ok(Json(RateResponse { from, to, rate }))
}
