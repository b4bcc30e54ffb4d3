//! Rule table inspection command

use std::path::Path;

use anyhow::Result;

use tally_core::{Classifier, Engine};

use super::{load_engine_with_source, percent};

pub fn cmd_rules(rules: Option<&Path>) -> Result<()> {
    let (engine, source) = load_engine_with_source(rules)?;

    println!();
    println!("📋 Tally Rule Tables");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Source: {}", source);
    print_rules(&engine);
    Ok(())
}

pub fn print_rules(engine: &Engine) {
    print_classifier(engine.receipts());
    print_classifier(engine.expenses());

    let policy = engine.anomalies().policy();
    println!();
    println!("   [anomaly]");
    println!(
        "     amount > {} → {}",
        policy.amount_ceiling,
        percent(policy.amount_confidence)
    );
    println!(
        "     category ∋ {} → {}",
        policy.flagged_categories.join(" | "),
        percent(policy.category_confidence)
    );
    println!("     normal → {}", percent(policy.normal_confidence));

    let forecast = engine.forecaster().config();
    println!();
    println!("   [forecast]");
    println!("     default period: {} days", forecast.default_total_days);

    let knowledge = engine.knowledge();
    println!();
    println!("   [knowledge]");
    for entry in knowledge.entries() {
        println!(
            "     {} → {} ({})",
            entry.keywords.join(" | "),
            percent(entry.confidence),
            entry.sources.join(", ")
        );
    }
    println!();
}

fn print_classifier(classifier: &Classifier) {
    let rules = classifier.rules();
    println!();
    println!("   [{}]", classifier.name());
    for rule in rules.rules() {
        let triggers: Vec<String> = rule
            .triggers
            .iter()
            .map(|t| match t.kind() {
                tally_core::MatchKind::Contains => t.as_str().to_string(),
                kind => format!("{}:{}", kind, t.as_str()),
            })
            .collect();
        println!(
            "     {} → {} {}",
            triggers.join(" | "),
            rule.label,
            percent(rule.confidence)
        );
    }
    let fallback = rules.fallback();
    println!("     (fallback) → {} {}", fallback.label, percent(fallback.confidence));
}
