use axum::extract::multipart::MultipartRejection;
use axum::extract::{Extension, Multipart, Path};
use axum::Json;
use serde_json::{json, Value};

use crate::domains::collection::{
    add_entry, list_entries, set_custom_image, AddToCollection, CollectionEntry,
};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::extract::ApiJson;

use super::read_form;

pub async fn list_collection_handler(
    Extension(deps): Extension<ServerDeps>,
) -> Result<Json<Vec<CollectionEntry>>, ApiError> {
    Ok(Json(list_entries(&deps).await?))
}

pub async fn add_to_collection_handler(
    Extension(deps): Extension<ServerDeps>,
    ApiJson(payload): ApiJson<AddToCollection>,
) -> Result<Json<Value>, ApiError> {
    let id = add_entry(payload, &deps).await?;
    Ok(Json(json!({ "_id": id })))
}

/// `PUT /api/collection/:id/image`
pub async fn set_custom_image_handler(
    Extension(deps): Extension<ServerDeps>,
    Path(entry_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let upload = read_form(multipart).await?.into_file()?;
    let url = set_custom_image(&entry_id, upload.bytes, &deps).await?;
    Ok(Json(json!({ "customImageUrl": url })))
}
