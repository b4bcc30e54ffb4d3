//! Document upload handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use tally_core::{DocumentListing, IngestStatus};

use super::read_upload;
use crate::{AppError, AppState};

/// Response for a document upload
#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub filename: String,
    pub status: IngestStatus,
    pub chunks_count: usize,
    pub message: String,
}

/// POST /api/v1/documents - Register a document for the knowledge base
///
/// Expects multipart form with:
/// - file: document (required, max 10MB)
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadDocumentResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    if upload.filename.is_empty() {
        return Err(AppError::bad_request("Uploaded file has no filename"));
    }

    let receipt = state
        .engine
        .register_document(&upload.filename, &upload.content);

    Ok(Json(UploadDocumentResponse {
        filename: receipt.record.filename,
        status: receipt.status,
        chunks_count: receipt.chunks_count,
        message: receipt.message,
    }))
}

/// GET /api/v1/documents - List uploaded documents in upload order
pub async fn list_documents(State(state): State<Arc<AppState>>) -> Json<DocumentListing> {
    Json(state.engine.list_documents())
}
