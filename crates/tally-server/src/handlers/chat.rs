//! Knowledge base chat handler

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
}

fn default_tenant() -> String {
    "default".to_string()
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub confidence: f64,
    pub sources: Vec<String>,
}

/// POST /api/v1/chat - Answer an internal policy question
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) =
        body.map_err(|e| AppError::bad_request(&format!("Invalid chat request: {}", e)))?;
    debug!(tenant = %request.tenant_id, "Chat question received");

    let answer = state.engine.ask(&request.question);

    Ok(Json(ChatResponse {
        answer: answer.answer,
        confidence: answer.confidence,
        sources: answer.sources,
    }))
}
