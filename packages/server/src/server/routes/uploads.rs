use axum::extract::multipart::MultipartRejection;
use axum::extract::{Extension, Multipart};
use axum::Json;
use serde_json::{json, Value};

use crate::domains::uploads::{file_stem, upload_image};
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;

use super::read_form;

/// `POST /api/upload-image` - store the `file` part as WebP.
pub async fn upload_image_handler(
    Extension(deps): Extension<ServerDeps>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let upload = read_form(multipart).await?.into_file()?;
    let stem = file_stem(upload.file_name.as_deref());

    let url = upload_image(deps.uploads.as_ref(), upload.bytes, &stem).await?;
    Ok(Json(json!({ "url": url })))
}
