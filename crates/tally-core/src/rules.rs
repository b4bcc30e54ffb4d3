//! Rule engine for heuristic classification
//!
//! A [`RuleSet`] is an ordered table evaluated top to bottom against normalized
//! input. The first rule with any matching trigger answers and no later rule is
//! consulted, even one with a higher confidence. When nothing matches, the set's
//! fallback answers with its own (lower) confidence. Evaluation never fails.
//!
//! Rule tables are data: they are loaded from configuration (see
//! [`crate::config`]) so real strategies can replace them without touching the
//! matching code.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Normalize raw input into the haystack rules are matched against
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// How a trigger is compared against normalized input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Trigger appears anywhere in the input
    #[default]
    Contains,
    /// Whole input equals the trigger
    Exact,
    /// Case-insensitive regular expression tested against the normalized input
    Regex,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Exact => "exact",
            Self::Regex => "regex",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A compiled trigger condition
#[derive(Debug, Clone)]
pub enum Trigger {
    Contains(String),
    Exact(String),
    Regex(Regex),
}

impl Trigger {
    /// Compile a trigger, normalizing plain tokens the same way input is normalized
    pub fn new(kind: MatchKind, pattern: &str) -> Result<Self> {
        let token = normalize(pattern);
        if token.is_empty() {
            return Err(Error::InvalidRule("trigger must not be empty".to_string()));
        }
        match kind {
            MatchKind::Contains => Ok(Self::Contains(token)),
            MatchKind::Exact => Ok(Self::Exact(token)),
            MatchKind::Regex => Ok(Self::Regex(
                RegexBuilder::new(pattern.trim())
                    .case_insensitive(true)
                    .build()?,
            )),
        }
    }

    pub fn kind(&self) -> MatchKind {
        match self {
            Self::Contains(_) => MatchKind::Contains,
            Self::Exact(_) => MatchKind::Exact,
            Self::Regex(_) => MatchKind::Regex,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Contains(token) | Self::Exact(token) => token,
            Self::Regex(re) => re.as_str(),
        }
    }

    /// Test against an already-normalized haystack
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Self::Contains(token) => haystack.contains(token.as_str()),
            Self::Exact(token) => haystack == token,
            Self::Regex(re) => re.is_match(haystack),
        }
    }
}

/// A trigger set mapped to a labeled outcome with a static confidence
#[derive(Debug, Clone)]
pub struct Rule {
    pub triggers: Vec<Trigger>,
    pub label: String,
    pub code: Option<String>,
    /// Human-readable detail attached to the outcome (e.g. mock OCR text)
    pub explanation: Option<String>,
    pub confidence: f64,
}

impl Rule {
    /// Create a rule with no triggers (usable directly as a fallback)
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            triggers: Vec::new(),
            label: label.into(),
            code: None,
            explanation: None,
            confidence,
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// First trigger that fires on the haystack, if any
    pub fn first_match(&self, haystack: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.matches(haystack))
    }

    fn validate_confidence(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::InvalidRule(format!(
                "confidence for '{}' must be within [0, 1], got {}",
                self.label, self.confidence
            )));
        }
        Ok(())
    }
}

/// Result of walking a rule set
#[derive(Debug, Clone, Copy)]
pub struct Evaluation<'a> {
    pub rule: &'a Rule,
    /// Position of the matched rule; `None` when the fallback answered
    pub index: Option<usize>,
    pub trigger: Option<&'a Trigger>,
}

impl Evaluation<'_> {
    pub fn is_fallback(&self) -> bool {
        self.index.is_none()
    }
}

/// Ordered, first-match-wins collection of rules with a fallback
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fallback: Rule,
}

impl RuleSet {
    /// Build a validated rule set
    ///
    /// Every rule needs at least one trigger and a confidence in [0, 1]. The
    /// fallback may not claim more confidence than any real rule.
    pub fn new(rules: Vec<Rule>, fallback: Rule) -> Result<Self> {
        for rule in &rules {
            if rule.triggers.is_empty() {
                return Err(Error::InvalidRule(format!(
                    "rule '{}' has no triggers",
                    rule.label
                )));
            }
            if rule.triggers.iter().any(|t| t.as_str().is_empty()) {
                return Err(Error::InvalidRule(format!(
                    "rule '{}' has an empty trigger",
                    rule.label
                )));
            }
            rule.validate_confidence()?;
        }
        fallback.validate_confidence()?;

        if let Some(min) = rules
            .iter()
            .map(|r| r.confidence)
            .min_by(|a, b| a.total_cmp(b))
        {
            if fallback.confidence > min {
                return Err(Error::InvalidRule(format!(
                    "fallback confidence {} exceeds lowest rule confidence {}",
                    fallback.confidence, min
                )));
            }
        }

        Ok(Self { rules, fallback })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> &Rule {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Walk the rules against a normalized haystack
    pub fn evaluate(&self, haystack: &str) -> Evaluation<'_> {
        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(trigger) = rule.first_match(haystack) {
                return Evaluation {
                    rule,
                    index: Some(index),
                    trigger: Some(trigger),
                };
            }
        }

        Evaluation {
            rule: &self.fallback,
            index: None,
            trigger: None,
        }
    }
}

/// Outcome of classifying one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub code: Option<String>,
    pub confidence: f64,
    pub explanation: Option<String>,
    /// False when the fallback answered
    pub matched: bool,
    /// The trigger that fired, for evidence
    pub trigger: Option<String>,
}

/// A named rule set plus input normalization
#[derive(Debug, Clone)]
pub struct Classifier {
    name: String,
    rules: RuleSet,
}

impl Classifier {
    pub fn new(name: impl Into<String>, rules: RuleSet) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify raw input; empty or unrecognized input yields the fallback
    pub fn classify(&self, raw_input: &str) -> ClassificationResult {
        let haystack = normalize(raw_input);
        let eval = self.rules.evaluate(&haystack);

        match eval.trigger {
            Some(trigger) => debug!(
                classifier = %self.name,
                trigger = trigger.as_str(),
                label = %eval.rule.label,
                "Rule matched"
            ),
            None => debug!(
                classifier = %self.name,
                label = %eval.rule.label,
                "No rule matched, using fallback"
            ),
        }

        ClassificationResult {
            label: eval.rule.label.clone(),
            code: eval.rule.code.clone(),
            confidence: eval.rule.confidence,
            explanation: eval.rule.explanation.clone(),
            matched: !eval.is_fallback(),
            trigger: eval.trigger.map(|t| t.as_str().to_string()),
        }
    }
}
