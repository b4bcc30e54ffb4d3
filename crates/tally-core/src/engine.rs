//! Decision engine facade
//!
//! Owns one instance of every component, built from an [`EngineConfig`].
//! Typed methods serve callers that know which task they want; [`Engine::run`]
//! dispatches a [`TaskInput`] and wraps the answer in the uniform [`Outcome`]
//! envelope.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::anomaly::{AnomalyDetector, AnomalyVerdict};
use crate::config::EngineConfig;
use crate::documents::{DocumentListing, DocumentRegistry, IngestReceipt};
use crate::error::{Error, Result};
use crate::forecast::{BudgetForecaster, BudgetReport};
use crate::knowledge::{KnowledgeAnswer, KnowledgeBase};
use crate::models::{BudgetState, Outcome, TaskKind, Transaction};
use crate::rules::{ClassificationResult, Classifier};

/// Decoded input for one decision task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskInput {
    Receipt { filename: String },
    Expense { description: String },
    Anomaly(Transaction),
    Forecast(BudgetState),
    Knowledge { question: String },
}

#[derive(Deserialize)]
struct ReceiptPayload {
    filename: String,
}

#[derive(Deserialize)]
struct ExpensePayload {
    description: String,
}

#[derive(Deserialize)]
struct KnowledgePayload {
    question: String,
}

impl TaskInput {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Receipt { .. } => TaskKind::Receipt,
            Self::Expense { .. } => TaskKind::Expense,
            Self::Anomaly(_) => TaskKind::Anomaly,
            Self::Forecast(_) => TaskKind::Forecast,
            Self::Knowledge { .. } => TaskKind::Knowledge,
        }
    }

    /// Decode a JSON payload for the given task
    pub fn decode(kind: TaskKind, payload: Value) -> Result<Self> {
        let invalid = |e: serde_json::Error| {
            Error::InvalidInput(format!("invalid {} input: {}", kind, e))
        };

        let input = match kind {
            TaskKind::Receipt => {
                let p: ReceiptPayload = serde_json::from_value(payload).map_err(invalid)?;
                Self::Receipt {
                    filename: p.filename,
                }
            }
            TaskKind::Expense => {
                let p: ExpensePayload = serde_json::from_value(payload).map_err(invalid)?;
                Self::Expense {
                    description: p.description,
                }
            }
            TaskKind::Anomaly => Self::Anomaly(serde_json::from_value(payload).map_err(invalid)?),
            TaskKind::Forecast => Self::Forecast(serde_json::from_value(payload).map_err(invalid)?),
            TaskKind::Knowledge => {
                let p: KnowledgePayload = serde_json::from_value(payload).map_err(invalid)?;
                Self::Knowledge {
                    question: p.question,
                }
            }
        };
        Ok(input)
    }
}

/// Single entry point over every decision component
#[derive(Debug)]
pub struct Engine {
    receipts: Classifier,
    expenses: Classifier,
    anomalies: AnomalyDetector,
    forecaster: BudgetForecaster,
    knowledge: KnowledgeBase,
    documents: DocumentRegistry,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, DocumentRegistry::new())
    }

    /// Build an engine around an existing registry
    pub fn with_registry(config: EngineConfig, documents: DocumentRegistry) -> Self {
        Self {
            receipts: Classifier::new("receipt", config.receipt),
            expenses: Classifier::new("expense", config.expense),
            anomalies: AnomalyDetector::new(config.anomaly),
            forecaster: BudgetForecaster::new(config.forecast),
            knowledge: config.knowledge,
            documents,
        }
    }

    /// Engine over the embedded default rule tables
    pub fn embedded() -> Result<Self> {
        Ok(Self::new(EngineConfig::embedded()?))
    }

    pub fn receipts(&self) -> &Classifier {
        &self.receipts
    }

    pub fn expenses(&self) -> &Classifier {
        &self.expenses
    }

    pub fn anomalies(&self) -> &AnomalyDetector {
        &self.anomalies
    }

    pub fn forecaster(&self) -> &BudgetForecaster {
        &self.forecaster
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn documents(&self) -> &DocumentRegistry {
        &self.documents
    }

    /// Suggest an account for an uploaded receipt (keyed on its filename)
    pub fn classify_receipt(&self, filename: &str) -> ClassificationResult {
        self.receipts.classify(filename)
    }

    /// Map a free-text expense description to an account
    pub fn classify_expense(&self, description: &str) -> ClassificationResult {
        self.expenses.classify(description)
    }

    /// Screen a card transaction; rejects negative or non-finite amounts
    pub fn detect_anomaly(&self, transaction: &Transaction) -> Result<AnomalyVerdict> {
        transaction.validate()?;
        Ok(self.anomalies.detect(transaction))
    }

    /// Project a department's spend and render its alert
    pub fn forecast_budget(&self, state: &BudgetState) -> Result<BudgetReport> {
        state.validate()?;
        Ok(self.forecaster.report(state))
    }

    pub fn ask(&self, question: &str) -> KnowledgeAnswer {
        self.knowledge.ask(question)
    }

    pub fn register_document(&self, filename: &str, content: &[u8]) -> IngestReceipt {
        self.documents.ingest(filename, content)
    }

    pub fn list_documents(&self) -> DocumentListing {
        self.documents.list_all()
    }

    /// Validate and dispatch one task, returning the uniform envelope
    pub fn run(&self, input: &TaskInput) -> Result<Outcome> {
        let task = input.kind();
        debug!(task = %task, "Running task");

        let outcome = match input {
            TaskInput::Receipt { filename } => {
                classification_outcome(task, self.classify_receipt(filename))
            }
            TaskInput::Expense { description } => {
                classification_outcome(task, self.classify_expense(description))
            }
            TaskInput::Anomaly(transaction) => anomaly_outcome(self.detect_anomaly(transaction)?),
            TaskInput::Forecast(state) => forecast_outcome(self.forecast_budget(state)?),
            TaskInput::Knowledge { question } => knowledge_outcome(self.ask(question)),
        };
        Ok(outcome)
    }
}

fn classification_outcome(task: TaskKind, result: ClassificationResult) -> Outcome {
    let explanation = result.explanation.unwrap_or_else(|| match &result.trigger {
        Some(trigger) => format!("matched '{}'", trigger),
        None => "no rule matched".to_string(),
    });
    Outcome {
        task,
        label: result.label,
        code: result.code,
        confidence: result.confidence,
        explanation,
        evidence: result.trigger.into_iter().collect(),
    }
}

fn anomaly_outcome(verdict: AnomalyVerdict) -> Outcome {
    let label = if verdict.is_anomaly() {
        "anomaly"
    } else {
        "normal"
    };
    Outcome {
        task: TaskKind::Anomaly,
        label: label.to_string(),
        code: None,
        confidence: verdict.confidence(),
        explanation: verdict.message().to_string(),
        evidence: verdict.evidence(),
    }
}

fn forecast_outcome(report: BudgetReport) -> Outcome {
    let label = if report.forecast.will_exceed {
        "over_budget"
    } else {
        "within_budget"
    };
    Outcome {
        task: TaskKind::Forecast,
        label: label.to_string(),
        code: None,
        confidence: report.forecast.confidence,
        explanation: report.alert_message,
        evidence: report.evidence,
    }
}

fn knowledge_outcome(answer: KnowledgeAnswer) -> Outcome {
    Outcome {
        task: TaskKind::Knowledge,
        label: answer.answer,
        code: None,
        confidence: answer.confidence,
        explanation: match answer.keyword {
            Some(keyword) => format!("matched keyword '{}'", keyword),
            None => "no knowledge entry matched".to_string(),
        },
        evidence: answer.sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> Engine {
        Engine::embedded().unwrap()
    }

    #[test]
    fn test_receipt_outcome_uses_mock_text() {
        let outcome = engine()
            .run(&TaskInput::Receipt {
                filename: "Starbucks_Coffee.jpg".to_string(),
            })
            .unwrap();

        assert_eq!(outcome.task, TaskKind::Receipt);
        assert_eq!(outcome.label, "복리후생비");
        assert_eq!(outcome.confidence, 0.92);
        assert_eq!(outcome.explanation, "커피 5,000원 (Mock OCR)");
        assert_eq!(outcome.evidence, vec!["coffee"]);
    }

    #[test]
    fn test_expense_fallback_outcome() {
        let outcome = engine()
            .run(&TaskInput::Expense {
                description: "회식비 정산".to_string(),
            })
            .unwrap();

        assert_eq!(outcome.label, "미분류");
        assert_eq!(outcome.code.as_deref(), Some("9999"));
        assert_eq!(outcome.confidence, 0.5);
        assert_eq!(outcome.explanation, "no rule matched");
        assert!(outcome.evidence.is_empty());
    }

    #[test]
    fn test_anomaly_outcome_labels() {
        let engine = engine();

        let flagged = engine
            .run(&TaskInput::Anomaly(Transaction::new(1_500_000.0, "domestic", "")))
            .unwrap();
        assert_eq!(flagged.label, "anomaly");
        assert_eq!(flagged.confidence, 0.95);
        assert_eq!(flagged.evidence.len(), 1);

        let normal = engine
            .run(&TaskInput::Anomaly(Transaction::new(5_000.0, "식대", "")))
            .unwrap();
        assert_eq!(normal.label, "normal");
        assert_eq!(normal.confidence, 0.92);
        assert!(normal.evidence.is_empty());
    }

    #[test]
    fn test_forecast_outcome() {
        let state = BudgetState::new("개발팀", 500_000.0, 1_000_000.0, 100).with_total_days(365);
        let outcome = engine().run(&TaskInput::Forecast(state)).unwrap();

        assert_eq!(outcome.label, "over_budget");
        assert!(outcome.explanation.contains("825,000원"));
        assert!(outcome.evidence.contains(&"projected_spent=1825000".to_string()));
    }

    #[test]
    fn test_run_rejects_invalid_inputs() {
        let engine = engine();

        let negative = TaskInput::Anomaly(Transaction::new(-10.0, "식대", ""));
        assert!(matches!(engine.run(&negative), Err(Error::InvalidInput(_))));

        let no_budget = TaskInput::Forecast(BudgetState::new("개발팀", 10.0, 0.0, 5));
        assert!(matches!(engine.run(&no_budget), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_typed_methods_reject_invalid_inputs() {
        let engine = engine();

        let nan = Transaction::new(f64::NAN, "식대", "");
        assert!(matches!(engine.detect_anomaly(&nan), Err(Error::InvalidInput(_))));

        let infinite = Transaction::new(f64::INFINITY, "해외", "");
        assert!(matches!(engine.detect_anomaly(&infinite), Err(Error::InvalidInput(_))));

        let nan_spent = BudgetState::new("개발팀", f64::NAN, 1_000.0, 5);
        assert!(matches!(engine.forecast_budget(&nan_spent), Err(Error::InvalidInput(_))));

        let zero_period = BudgetState::new("개발팀", 10.0, 1_000.0, 5).with_total_days(0);
        assert!(matches!(engine.forecast_budget(&zero_period), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_typed_forecast_matches_envelope() {
        let engine = engine();
        let state = BudgetState::new("개발팀", 500_000.0, 1_000_000.0, 100).with_total_days(365);

        let report = engine.forecast_budget(&state).unwrap();
        let outcome = engine.run(&TaskInput::Forecast(state)).unwrap();

        assert_eq!(outcome.explanation, report.alert_message);
        assert_eq!(outcome.evidence, report.evidence);
        assert_eq!(outcome.confidence, report.forecast.confidence);
    }

    #[test]
    fn test_knowledge_outcome_cites_sources() {
        let outcome = engine()
            .run(&TaskInput::Knowledge {
                question: "연차는 며칠인가요?".to_string(),
            })
            .unwrap();

        assert_eq!(outcome.confidence, 0.95);
        assert_eq!(outcome.evidence, vec!["사내규정.pdf"]);
    }

    #[test]
    fn test_decode_payloads() {
        let input = TaskInput::decode(TaskKind::Expense, json!({"description": "택시"})).unwrap();
        assert_eq!(
            input,
            TaskInput::Expense {
                description: "택시".to_string()
            }
        );

        let input = TaskInput::decode(
            TaskKind::Forecast,
            json!({"department": "개발팀", "current_spent": 1.0, "total_budget": 2.0, "days_elapsed": 3}),
        )
        .unwrap();
        assert_eq!(input.kind(), TaskKind::Forecast);

        let err = TaskInput::decode(TaskKind::Anomaly, json!({"category": "식대"})).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_registry_is_injectable() {
        let registry = DocumentRegistry::new();
        registry.register("seed.pdf", b"1234");

        let engine = Engine::with_registry(EngineConfig::embedded().unwrap(), registry);
        engine.register_document("next.pdf", b"12");

        let listing = engine.list_documents();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.documents[0].filename, "seed.pdf");
    }
}
