//! Generic task endpoint returning the uniform outcome envelope

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use tally_core::{Outcome, TaskInput, TaskKind};

use crate::{AppError, AppState};

/// POST /api/v1/engine/:task - Run any decision task
///
/// `task` is one of receipt, expense, anomaly, forecast, knowledge (or an
/// alias such as ocr, classify, detect, budget, chat). The JSON body carries
/// that task's input.
pub async fn run_task(
    State(state): State<Arc<AppState>>,
    Path(task): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Outcome>, AppError> {
    let kind: TaskKind = task.parse().map_err(|e: String| AppError::bad_request(&e))?;
    let Json(payload) =
        body.map_err(|e| AppError::bad_request(&format!("Invalid request body: {}", e)))?;

    let input = TaskInput::decode(kind, payload).map_err(AppError::from_engine)?;
    let outcome = state.engine.run(&input).map_err(AppError::from_engine)?;

    Ok(Json(outcome))
}
