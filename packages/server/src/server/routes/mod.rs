// HTTP routes
pub mod collection;
pub mod health;
pub mod rate;
pub mod search;
pub mod uploads;

pub use collection::*;
pub use health::*;
pub use rate::*;
pub use search::*;
pub use uploads::*;

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use std::collections::HashMap;

use crate::server::error::ApiError;

/// The `file` part of a multipart form.
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// A drained multipart form: the `file` part plus any text fields.
#[derive(Default)]
pub struct Form {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl Form {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn into_file(self) -> Result<UploadedFile, ApiError> {
        self.file
            .filter(|f| !f.bytes.is_empty())
            .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))
    }
}

/// Drain a multipart body; a missing or malformed multipart request is a 400.
pub async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Form, ApiError> {
    let mut multipart = multipart?;
    let mut form = Form::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            form.file = Some(UploadedFile {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
