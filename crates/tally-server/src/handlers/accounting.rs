//! Accounting handlers (receipt OCR, expense classification)

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::read_upload;
use crate::{AppError, AppState};

/// Response for a receipt upload
#[derive(Debug, Serialize)]
pub struct OcrResponse {
    /// Extracted receipt text (mock, keyed on the filename)
    pub text: String,
    pub suggested_account: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// POST /api/v1/accounting/ocr - Suggest an account for an uploaded receipt
///
/// Expects multipart form with:
/// - file: receipt image (required, max 10MB)
pub async fn ocr_receipt(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OcrResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    debug!(filename = %upload.filename, size = upload.content.len(), "Receipt uploaded");

    let result = state.engine.classify_receipt(&upload.filename);

    Ok(Json(OcrResponse {
        text: result.explanation.unwrap_or_default(),
        suggested_account: result.label,
        confidence: result.confidence,
        evidence: result.trigger.into_iter().collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub description: Option<String>,
}

/// Response for expense classification
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub account_code: String,
    pub account_name: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// POST /api/v1/accounting/classify?description=... - Map a description to an account
pub async fn classify_expense(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClassifyQuery>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let description = query
        .description
        .ok_or_else(|| AppError::bad_request("Missing description parameter"))?;

    let result = state.engine.classify_expense(&description);

    Ok(Json(ClassifyResponse {
        account_code: result.code.unwrap_or_default(),
        account_name: result.label,
        confidence: result.confidence,
        evidence: result.trigger.into_iter().collect(),
    }))
}
