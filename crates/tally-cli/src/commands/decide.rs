//! Offline decision commands
//!
//! Each command runs one task through the engine facade and prints either a
//! short human-readable summary or the JSON outcome envelope.

use anyhow::{Context, Result};

use tally_core::{BudgetState, Engine, Outcome, TaskInput, Transaction};

use super::percent;

pub fn cmd_classify(engine: &Engine, description: &str, json: bool) -> Result<Outcome> {
    let input = TaskInput::Expense {
        description: description.to_string(),
    };
    run_and_print(engine, &input, json)
}

pub fn cmd_receipt(engine: &Engine, filename: &str, json: bool) -> Result<Outcome> {
    let input = TaskInput::Receipt {
        filename: filename.to_string(),
    };
    run_and_print(engine, &input, json)
}

pub fn cmd_detect(
    engine: &Engine,
    amount: f64,
    category: &str,
    timestamp: Option<&str>,
    json: bool,
) -> Result<Outcome> {
    let input = TaskInput::Anomaly(Transaction::new(
        amount,
        category,
        timestamp.unwrap_or_default(),
    ));
    run_and_print(engine, &input, json)
}

pub fn cmd_forecast(
    engine: &Engine,
    department: &str,
    spent: f64,
    budget: f64,
    days_elapsed: u32,
    total_days: Option<u32>,
    json: bool,
) -> Result<Outcome> {
    let state = BudgetState {
        department: department.to_string(),
        current_spent: spent,
        total_budget: budget,
        days_elapsed,
        total_days,
    };
    run_and_print(engine, &TaskInput::Forecast(state), json)
}

pub fn cmd_ask(engine: &Engine, question: &str, json: bool) -> Result<Outcome> {
    let input = TaskInput::Knowledge {
        question: question.to_string(),
    };
    run_and_print(engine, &input, json)
}

fn run_and_print(engine: &Engine, input: &TaskInput, json: bool) -> Result<Outcome> {
    let outcome = engine
        .run(input)
        .with_context(|| format!("Failed to run {} task", input.kind()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(outcome)
}

fn print_outcome(outcome: &Outcome) {
    println!();
    match &outcome.code {
        Some(code) => println!("📒 {} → {} (code {})", outcome.task, outcome.label, code),
        None => println!("📒 {} → {}", outcome.task, outcome.label),
    }
    println!("   Confidence: {}", percent(outcome.confidence));
    println!("   {}", outcome.explanation);
    if !outcome.evidence.is_empty() {
        println!("   Evidence: {}", outcome.evidence.join(", "));
    }
    println!();
}
