//! Domain models for Tally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Decision tasks the engine can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Receipt upload → suggested account (keyed on filename)
    Receipt,
    /// Free-text expense description → account name and code
    Expense,
    /// Card transaction → anomaly verdict
    Anomaly,
    /// Partial-period spend → budget overrun projection
    Forecast,
    /// Policy question → answer with citations
    Knowledge,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Expense => "expense",
            Self::Anomaly => "anomaly",
            Self::Forecast => "forecast",
            Self::Knowledge => "knowledge",
        }
    }

    /// Get all task kinds
    pub fn all() -> &'static [TaskKind] {
        &[
            Self::Receipt,
            Self::Expense,
            Self::Anomaly,
            Self::Forecast,
            Self::Knowledge,
        ]
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "receipt" | "ocr" => Ok(Self::Receipt),
            "expense" | "classify" => Ok(Self::Expense),
            "anomaly" | "detect" => Ok(Self::Anomaly),
            "forecast" | "budget" => Ok(Self::Forecast),
            "knowledge" | "chat" | "ask" => Ok(Self::Knowledge),
            _ => Err(format!("Unknown task: {}", s)),
        }
    }
}

/// A card transaction submitted for anomaly screening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction amount in currency units (non-negative)
    pub amount: f64,
    /// Merchant or spending category, e.g. "해외 출장" or "overseas travel"
    pub category: String,
    /// When the transaction happened, as supplied by the caller
    #[serde(default)]
    pub timestamp: String,
}

impl Transaction {
    pub fn new(amount: f64, category: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// Budget execution state for one department part-way through a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetState {
    pub department: String,
    pub current_spent: f64,
    pub total_budget: f64,
    pub days_elapsed: u32,
    /// Length of the budget period; the forecaster's default applies when unset
    #[serde(default)]
    pub total_days: Option<u32>,
}

impl BudgetState {
    pub fn new(
        department: impl Into<String>,
        current_spent: f64,
        total_budget: f64,
        days_elapsed: u32,
    ) -> Self {
        Self {
            department: department.into(),
            current_spent,
            total_budget,
            days_elapsed,
            total_days: None,
        }
    }

    pub fn with_total_days(mut self, total_days: u32) -> Self {
        self.total_days = Some(total_days);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.current_spent.is_finite() || self.current_spent < 0.0 {
            return Err(Error::InvalidInput(format!(
                "current_spent must be a non-negative number, got {}",
                self.current_spent
            )));
        }
        if !self.total_budget.is_finite() || self.total_budget <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "total_budget must be positive, got {}",
                self.total_budget
            )));
        }
        if self.total_days == Some(0) {
            return Err(Error::InvalidInput(
                "total_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// An uploaded document as recorded by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub filename: String,
    /// Size of the uploaded content in bytes
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Uniform result envelope returned for every decision task
///
/// Always carries a label, a confidence and an explanation, including when a
/// fallback or "normal" outcome answered. `evidence` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub task: TaskKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub confidence: f64,
    pub explanation: String,
    pub evidence: Vec<String>,
}
