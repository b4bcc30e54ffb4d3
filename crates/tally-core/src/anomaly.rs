//! Card transaction anomaly detection
//!
//! Threshold rules evaluated in a fixed order:
//! 1. Amount above the configured ceiling
//! 2. Category containing a flagged term (e.g. overseas spend)
//!
//! The first satisfied rule decides the reason and confidence. When neither
//! fires the verdict is [`AnomalyVerdict::Normal`], a confirmed-normal outcome
//! with its own confidence rather than an "unknown" fallback.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::rules::normalize;

/// Thresholds and messages for anomaly detection
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyPolicy {
    /// Amounts strictly above this are flagged
    pub amount_ceiling: f64,
    pub amount_confidence: f64,
    pub amount_reason: String,
    /// Normalized terms; a category containing any of them is flagged
    pub flagged_categories: Vec<String>,
    pub category_confidence: f64,
    pub category_reason: String,
    pub normal_confidence: f64,
    pub normal_reason: String,
}

impl AnomalyPolicy {
    pub fn validate(&self) -> Result<()> {
        if !self.amount_ceiling.is_finite() || self.amount_ceiling < 0.0 {
            return Err(Error::InvalidRule(format!(
                "anomaly amount_ceiling must be non-negative, got {}",
                self.amount_ceiling
            )));
        }
        for (name, value) in [
            ("amount_confidence", self.amount_confidence),
            ("category_confidence", self.category_confidence),
            ("normal_confidence", self.normal_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidRule(format!(
                    "anomaly {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.flagged_categories.iter().any(|t| t.is_empty()) {
            return Err(Error::InvalidRule(
                "anomaly flagged_categories must not contain empty terms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which threshold rule flagged a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AnomalyReason {
    AmountAboveCeiling { amount: f64, ceiling: f64 },
    FlaggedCategory { category: String, term: String },
}

impl AnomalyReason {
    pub fn evidence(&self) -> String {
        match self {
            Self::AmountAboveCeiling { amount, ceiling } => {
                format!("amount {} exceeds ceiling {}", amount, ceiling)
            }
            Self::FlaggedCategory { category, term } => {
                format!("category '{}' contains flagged term '{}'", category, term)
            }
        }
    }
}

/// Result of screening a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AnomalyVerdict {
    Flagged {
        reason: AnomalyReason,
        message: String,
        confidence: f64,
    },
    Normal {
        message: String,
        confidence: f64,
    },
}

impl AnomalyVerdict {
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Self::Flagged { .. })
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Self::Flagged { confidence, .. } | Self::Normal { confidence, .. } => *confidence,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Flagged { message, .. } | Self::Normal { message, .. } => message,
        }
    }

    pub fn reason(&self) -> Option<&AnomalyReason> {
        match self {
            Self::Flagged { reason, .. } => Some(reason),
            Self::Normal { .. } => None,
        }
    }

    pub fn evidence(&self) -> Vec<String> {
        self.reason().map(|r| vec![r.evidence()]).unwrap_or_default()
    }
}

/// Screens transactions against an [`AnomalyPolicy`]
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    policy: AnomalyPolicy,
}

impl AnomalyDetector {
    pub fn new(policy: AnomalyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AnomalyPolicy {
        &self.policy
    }

    pub fn detect(&self, transaction: &Transaction) -> AnomalyVerdict {
        let verdict = if let Some(reason) = self.check_amount(transaction) {
            AnomalyVerdict::Flagged {
                reason,
                message: self.policy.amount_reason.clone(),
                confidence: self.policy.amount_confidence,
            }
        } else if let Some(reason) = self.check_category(transaction) {
            AnomalyVerdict::Flagged {
                reason,
                message: self.policy.category_reason.clone(),
                confidence: self.policy.category_confidence,
            }
        } else {
            AnomalyVerdict::Normal {
                message: self.policy.normal_reason.clone(),
                confidence: self.policy.normal_confidence,
            }
        };

        debug!(
            amount = transaction.amount,
            category = %transaction.category,
            anomaly = verdict.is_anomaly(),
            "Transaction screened"
        );

        verdict
    }

    fn check_amount(&self, transaction: &Transaction) -> Option<AnomalyReason> {
        (transaction.amount > self.policy.amount_ceiling).then(|| {
            AnomalyReason::AmountAboveCeiling {
                amount: transaction.amount,
                ceiling: self.policy.amount_ceiling,
            }
        })
    }

    fn check_category(&self, transaction: &Transaction) -> Option<AnomalyReason> {
        let category = normalize(&transaction.category);
        self.policy
            .flagged_categories
            .iter()
            .find(|term| category.contains(term.as_str()))
            .map(|term| AnomalyReason::FlaggedCategory {
                category: transaction.category.clone(),
                term: term.clone(),
            })
    }
}
