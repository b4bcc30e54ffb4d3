//! Tally Core Library
//!
//! Heuristic decision engine behind the Tally finance assistant:
//! - Ordered, first-match-wins rule tables (receipt and expense classification)
//! - Threshold-based card transaction anomaly detection
//! - Linear run-rate budget forecasting
//! - Keyword-matched knowledge base answers with citations
//! - In-memory document registry (mock ingestion)
//! - Rule table configuration with embedded defaults and file overrides
//!
//! Every operation answers; confidence is the only signal of uncertainty.

pub mod anomaly;
pub mod config;
pub mod documents;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod format;
pub mod knowledge;
pub mod models;
pub mod rules;

pub use anomaly::{AnomalyDetector, AnomalyPolicy, AnomalyReason, AnomalyVerdict};
pub use config::{load_config, ConfigSource, EngineConfig};
pub use documents::{DocumentListing, DocumentRegistry, IngestReceipt, IngestStatus};
pub use engine::{Engine, TaskInput};
pub use error::{Error, Result};
pub use forecast::{BudgetForecast, BudgetForecaster, BudgetReport, ForecastConfig};
pub use format::CurrencyFormat;
pub use knowledge::{KnowledgeAnswer, KnowledgeBase, KnowledgeEntry};
pub use models::{BudgetState, DocumentRecord, Outcome, TaskKind, Transaction};
pub use rules::{ClassificationResult, Classifier, MatchKind, Rule, RuleSet, Trigger};
