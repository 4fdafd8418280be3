//! Local-directory upload sink. Files are served back by the router under
//! `/uploads`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::BaseUploadSink;

pub const UPLOADS_ROUTE: &str = "/uploads";

pub struct LocalUploadSink {
    dir: PathBuf,
}

impl LocalUploadSink {
    /// Create the upload directory if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// File name safe to join onto the upload directory: path components and
/// leading dots are dropped, spaces become underscores.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = last
        .trim()
        .trim_start_matches('.')
        .chars()
        .map(|c| match c {
            ' ' => '_',
            c if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') => c,
            _ => '_',
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl BaseUploadSink for LocalUploadSink {
    async fn store(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String> {
        let file_name = sanitize_file_name(suggested_name);
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;

        debug!(file = %file_name, bytes = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
    }
}
