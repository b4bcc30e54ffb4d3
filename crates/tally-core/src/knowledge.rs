//! Knowledge base lookup for internal policy questions
//!
//! Keyword matching over a static table, using the same first-match-wins
//! discipline as [`crate::rules`]. The answer is the full entry text plus its
//! source documents. When no keyword matches, the fixed "cannot answer"
//! message is returned with confidence exactly 0 and no sources, which callers
//! treat as a non-answer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::rules::{normalize, MatchKind, Rule, RuleSet, Trigger};

/// One entry in the knowledge table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Any of these appearing in the question selects the entry
    pub keywords: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence: f64,
}

/// Answer to a knowledge question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeAnswer {
    pub answer: String,
    pub confidence: f64,
    /// Documents the answer is drawn from (empty for a non-answer)
    pub sources: Vec<String>,
    /// Keyword that selected the entry
    pub keyword: Option<String>,
}

impl KnowledgeAnswer {
    pub fn is_answered(&self) -> bool {
        self.keyword.is_some()
    }
}

/// Read-only keyword → answer table, built once at startup
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    rules: RuleSet,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>, no_answer: impl Into<String>) -> Result<Self> {
        let mut rules = Vec::with_capacity(entries.len());
        for entry in &entries {
            if entry.keywords.is_empty() {
                return Err(Error::InvalidRule(format!(
                    "knowledge entry '{}' has no keywords",
                    entry.answer
                )));
            }
            let mut rule = Rule::new(entry.answer.clone(), entry.confidence);
            for keyword in &entry.keywords {
                rule = rule.with_trigger(Trigger::new(MatchKind::Contains, keyword)?);
            }
            rules.push(rule);
        }

        // Confidence 0 marks the non-answer
        let rules = RuleSet::new(rules, Rule::new(no_answer, 0.0))?;

        Ok(Self { entries, rules })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn no_answer(&self) -> &str {
        &self.rules.fallback().label
    }

    pub fn ask(&self, question: &str) -> KnowledgeAnswer {
        let eval = self.rules.evaluate(&normalize(question));

        let Some(index) = eval.index else {
            debug!("No knowledge entry matched question");
            return KnowledgeAnswer {
                answer: eval.rule.label.clone(),
                confidence: eval.rule.confidence,
                sources: Vec::new(),
                keyword: None,
            };
        };

        let entry = &self.entries[index];
        let keyword = eval.trigger.map(|t| t.as_str().to_string());
        debug!(keyword = ?keyword, "Knowledge entry matched");

        KnowledgeAnswer {
            answer: entry.answer.clone(),
            confidence: entry.confidence,
            sources: entry.sources.clone(),
            keyword,
        }
    }
}
