//! Rule table configuration
//!
//! Every confidence, trigger and threshold the engine uses is data loaded from
//! TOML. Resolution order:
//! 1. Explicit path (CLI `--rules` / `TALLY_RULES_PATH`), if the file exists
//! 2. Override in the data dir (~/.local/share/tally/config/rules.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! An override file only needs the sections it changes. Missing rule tables are
//! taken whole from the embedded defaults; missing anomaly, forecast and
//! knowledge fields are filled in one by one from the embedded values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::anomaly::AnomalyPolicy;
use crate::error::{Error, Result};
use crate::forecast::ForecastConfig;
use crate::format::CurrencyFormat;
use crate::knowledge::{KnowledgeBase, KnowledgeEntry};
use crate::rules::{normalize, MatchKind, Rule, RuleSet, Trigger};

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/rules.toml");

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Validated configuration for every engine component
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub receipt: RuleSet,
    pub expense: RuleSet,
    pub anomaly: AnomalyPolicy,
    pub forecast: ForecastConfig,
    pub knowledge: KnowledgeBase,
}

impl EngineConfig {
    /// Configuration built from the embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("rules.toml"))
}

/// Load configuration (explicit path, then data-dir override, then embedded)
pub fn load_config(override_path: Option<&Path>) -> Result<(EngineConfig, ConfigSource)> {
    if let Some(path) = override_path {
        if path.exists() {
            return load_file(path);
        }
        warn!(
            path = %path.display(),
            "Rule config not found, falling back to defaults"
        );
    }

    if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            return load_file(&default_path);
        }
    }

    info!("Using embedded rule tables");
    Ok((EngineConfig::embedded()?, ConfigSource::Embedded))
}

fn load_file(path: &Path) -> Result<(EngineConfig, ConfigSource)> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    info!(path = %path.display(), "Loaded rule tables");
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    receipt: Option<RawRuleSet>,
    expense: Option<RawRuleSet>,
    anomaly: Option<RawAnomaly>,
    forecast: Option<RawForecast>,
    knowledge: Option<RawKnowledge>,
}

#[derive(Debug, Deserialize)]
struct RawRuleSet {
    #[serde(default)]
    rules: Vec<RawRule>,
    fallback: RawFallback,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    triggers: Vec<String>,
    #[serde(default, rename = "match")]
    match_kind: MatchKind,
    label: String,
    code: Option<String>,
    explanation: Option<String>,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RawFallback {
    label: String,
    code: Option<String>,
    explanation: Option<String>,
    confidence: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnomaly {
    amount_ceiling: Option<f64>,
    amount_confidence: Option<f64>,
    amount_reason: Option<String>,
    flagged_categories: Option<Vec<String>>,
    category_confidence: Option<f64>,
    category_reason: Option<String>,
    normal_confidence: Option<f64>,
    normal_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawForecast {
    default_total_days: Option<u32>,
    over_budget_message: Option<String>,
    within_budget_message: Option<String>,
    currency_prefix: Option<String>,
    currency_suffix: Option<String>,
    thousands_separator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawKnowledge {
    no_answer: Option<String>,
    #[serde(default)]
    entries: Vec<KnowledgeEntry>,
}

impl RawAnomaly {
    /// Fill fields this section leaves out from `base`
    fn overlay(self, base: Self) -> Self {
        Self {
            amount_ceiling: self.amount_ceiling.or(base.amount_ceiling),
            amount_confidence: self.amount_confidence.or(base.amount_confidence),
            amount_reason: self.amount_reason.or(base.amount_reason),
            flagged_categories: self.flagged_categories.or(base.flagged_categories),
            category_confidence: self.category_confidence.or(base.category_confidence),
            category_reason: self.category_reason.or(base.category_reason),
            normal_confidence: self.normal_confidence.or(base.normal_confidence),
            normal_reason: self.normal_reason.or(base.normal_reason),
        }
    }
}

impl RawForecast {
    /// Fill fields this section leaves out from `base`
    fn overlay(self, base: Self) -> Self {
        Self {
            default_total_days: self.default_total_days.or(base.default_total_days),
            over_budget_message: self.over_budget_message.or(base.over_budget_message),
            within_budget_message: self.within_budget_message.or(base.within_budget_message),
            currency_prefix: self.currency_prefix.or(base.currency_prefix),
            currency_suffix: self.currency_suffix.or(base.currency_suffix),
            thousands_separator: self.thousands_separator.or(base.thousands_separator),
        }
    }
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut defaults: RawConfig = toml::from_str(DEFAULT_CONFIG)?;

    let receipt = match raw.receipt {
        Some(section) => section,
        None => embedded_section(defaults.receipt.take(), "receipt")?,
    };
    let expense = match raw.expense {
        Some(section) => section,
        None => embedded_section(defaults.expense.take(), "expense")?,
    };
    let knowledge = {
        let base = embedded_section(defaults.knowledge.take(), "knowledge")?;
        match raw.knowledge {
            Some(section) => RawKnowledge {
                no_answer: section.no_answer.or(base.no_answer),
                entries: section.entries,
            },
            None => base,
        }
    };

    let anomaly = raw
        .anomaly
        .unwrap_or_default()
        .overlay(defaults.anomaly.take().unwrap_or_default());
    let anomaly = build_anomaly(anomaly)?;
    anomaly.validate()?;

    let forecast = raw
        .forecast
        .unwrap_or_default()
        .overlay(defaults.forecast.take().unwrap_or_default());
    let forecast = build_forecast(forecast)?;
    forecast.validate()?;

    Ok(EngineConfig {
        receipt: build_rule_set(receipt)?,
        expense: build_rule_set(expense)?,
        anomaly,
        forecast,
        knowledge: build_knowledge(knowledge)?,
    })
}

fn embedded_section<T>(section: Option<T>, name: &str) -> Result<T> {
    section.ok_or_else(|| {
        Error::InvalidRule(format!(
            "section [{}] missing from config and embedded defaults",
            name
        ))
    })
}

/// A field that neither the override nor the embedded table set
fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        Error::InvalidRule(format!(
            "{} missing from config and embedded defaults",
            field
        ))
    })
}

fn build_fallback(raw: RawFallback) -> Rule {
    let mut rule = Rule::new(raw.label, raw.confidence);
    rule.code = raw.code;
    rule.explanation = raw.explanation;
    rule
}

fn build_rule_set(raw: RawRuleSet) -> Result<RuleSet> {
    let mut rules = Vec::with_capacity(raw.rules.len());
    for raw_rule in raw.rules {
        let kind = raw_rule.match_kind;
        let triggers = raw_rule
            .triggers
            .iter()
            .map(|t| Trigger::new(kind, t))
            .collect::<Result<Vec<_>>>()?;
        rules.push(Rule {
            triggers,
            label: raw_rule.label,
            code: raw_rule.code,
            explanation: raw_rule.explanation,
            confidence: raw_rule.confidence,
        });
    }
    RuleSet::new(rules, build_fallback(raw.fallback))
}

fn build_anomaly(raw: RawAnomaly) -> Result<AnomalyPolicy> {
    let flagged = required(raw.flagged_categories, "anomaly.flagged_categories")?;
    Ok(AnomalyPolicy {
        amount_ceiling: required(raw.amount_ceiling, "anomaly.amount_ceiling")?,
        amount_confidence: required(raw.amount_confidence, "anomaly.amount_confidence")?,
        amount_reason: required(raw.amount_reason, "anomaly.amount_reason")?,
        flagged_categories: flagged.iter().map(|t| normalize(t)).collect(),
        category_confidence: required(raw.category_confidence, "anomaly.category_confidence")?,
        category_reason: required(raw.category_reason, "anomaly.category_reason")?,
        normal_confidence: required(raw.normal_confidence, "anomaly.normal_confidence")?,
        normal_reason: required(raw.normal_reason, "anomaly.normal_reason")?,
    })
}

fn build_forecast(raw: RawForecast) -> Result<ForecastConfig> {
    Ok(ForecastConfig {
        default_total_days: required(raw.default_total_days, "forecast.default_total_days")?,
        over_budget_message: required(raw.over_budget_message, "forecast.over_budget_message")?,
        within_budget_message: required(
            raw.within_budget_message,
            "forecast.within_budget_message",
        )?,
        currency: CurrencyFormat {
            prefix: required(raw.currency_prefix, "forecast.currency_prefix")?,
            suffix: required(raw.currency_suffix, "forecast.currency_suffix")?,
            thousands_separator: required(
                raw.thousands_separator,
                "forecast.thousands_separator",
            )?,
        },
    })
}

fn build_knowledge(raw: RawKnowledge) -> Result<KnowledgeBase> {
    let no_answer = required(raw.no_answer, "knowledge.no_answer")?;
    KnowledgeBase::new(raw.entries, no_answer)
}
