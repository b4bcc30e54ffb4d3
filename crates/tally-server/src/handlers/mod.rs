//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounting;
pub mod anomaly;
pub mod chat;
pub mod documents;
pub mod engine;

// Re-export all handlers for use in router
pub use accounting::*;
pub use anomaly::*;
pub use chat::*;
pub use documents::*;
pub use engine::*;

use axum::extract::Multipart;

use crate::{AppError, MAX_UPLOAD_SIZE};

/// A file pulled out of a multipart form
pub struct Upload {
    /// Client-supplied filename (empty when the part carried none)
    pub filename: String,
    pub content: Vec<u8>,
}

/// Read the `file` field of a multipart form
///
/// Other fields are ignored. Oversized files and forms without a `file`
/// field are rejected.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        // Check file size limit
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        upload = Some(Upload {
            filename,
            content: bytes.to_vec(),
        });
    }

    upload.ok_or_else(|| AppError::bad_request("Missing file field"))
}
