//! Image uploads: decode, re-encode as WebP, hand to the upload sink.

use anyhow::Context;
use image::ImageFormat;
use std::io::Cursor;
use thiserror::Error;
use tracing::info;

use crate::kernel::BaseUploadSink;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Decode any supported image and re-encode it as WebP (RGB).
pub fn to_webp(bytes: &[u8]) -> Result<Vec<u8>, UploadError> {
    let image =
        image::load_from_memory(bytes).map_err(|e| UploadError::InvalidImage(e.to_string()))?;
    let rgb = image::DynamicImage::ImageRgb8(image.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::WebP)
        .context("Failed to encode WebP")?;
    Ok(out.into_inner())
}

/// Base name of an uploaded file without its extension.
pub fn file_stem(file_name: Option<&str>) -> String {
    let name = file_name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("upload");
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => base.to_string(),
        Some(dot) => base[..dot].to_string(),
    }
}

async fn convert_off_thread(bytes: Vec<u8>) -> Result<Vec<u8>, UploadError> {
    tokio::task::spawn_blocking(move || to_webp(&bytes))
        .await
        .context("Image conversion task failed")?
}

/// Store an uploaded image as `{stem}.webp`, returning its URL.
pub async fn upload_image(
    sink: &dyn BaseUploadSink,
    bytes: Vec<u8>,
    stem: &str,
) -> Result<String, UploadError> {
    let webp = convert_off_thread(bytes).await?;
    let url = sink.store(webp, &format!("{}.webp", stem)).await?;
    info!(url = %url, "Image uploaded");
    Ok(url)
}
