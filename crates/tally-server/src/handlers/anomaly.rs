//! Anomaly detection and budget forecast handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use tally_core::{BudgetState, Transaction};

use crate::{AppError, AppState};

/// Response for a transaction anomaly check
#[derive(Debug, Serialize)]
pub struct AnomalyResponse {
    pub is_anomaly: bool,
    pub reason: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// POST /api/v1/anomaly/detect - Screen a card transaction
pub async fn detect_anomaly(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Transaction>, JsonRejection>,
) -> Result<Json<AnomalyResponse>, AppError> {
    let Json(transaction) =
        body.map_err(|e| AppError::bad_request(&format!("Invalid transaction: {}", e)))?;
    let verdict = state
        .engine
        .detect_anomaly(&transaction)
        .map_err(AppError::from_engine)?;

    Ok(Json(AnomalyResponse {
        is_anomaly: verdict.is_anomaly(),
        reason: verdict.message().to_string(),
        confidence: verdict.confidence(),
        evidence: verdict.evidence(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub department: String,
    pub current_spent: f64,
    pub total_budget: f64,
    pub days_elapsed: u32,
    pub total_days: Option<u32>,
}

/// Response for a budget forecast
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub department: String,
    pub budget: f64,
    pub spent: f64,
    pub daily_average: f64,
    pub projected_spent: f64,
    pub will_exceed: bool,
    pub alert_message: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// POST /api/v1/anomaly/budget-forecast - Project period-end spend
///
/// Query parameters: department, current_spent, total_budget, days_elapsed,
/// and optionally total_days (defaults to the configured period length).
pub async fn forecast_budget(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Result<Json<ForecastResponse>, AppError> {
    let Query(query) =
        query.map_err(|e| AppError::bad_request(&format!("Invalid forecast parameters: {}", e)))?;

    let budget = BudgetState {
        department: query.department,
        current_spent: query.current_spent,
        total_budget: query.total_budget,
        days_elapsed: query.days_elapsed,
        total_days: query.total_days,
    };
    let report = state
        .engine
        .forecast_budget(&budget)
        .map_err(AppError::from_engine)?;
    let forecast = report.forecast;

    Ok(Json(ForecastResponse {
        department: forecast.department,
        budget: forecast.total_budget,
        spent: forecast.current_spent,
        daily_average: forecast.daily_average,
        projected_spent: forecast.projected_spent,
        will_exceed: forecast.will_exceed,
        alert_message: report.alert_message,
        confidence: forecast.confidence,
        evidence: report.evidence,
    }))
}
