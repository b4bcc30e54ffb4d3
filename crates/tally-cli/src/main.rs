//! Tally CLI - Heuristic finance decision engine
//!
//! Usage:
//!   tally serve --port 8000            Start web server
//!   tally classify "택시비 정산"         Classify an expense description
//!   tally detect 1500000 "해외 결제"     Screen a card transaction
//!   tally forecast 개발팀 500000 1000000 100
//!   tally rules                        Show the active rule tables

mod cli;
mod commands;


use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

/// Environment variable naming a rule table file
const RULES_PATH_ENV: &str = "TALLY_RULES_PATH";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    // --rules wins over the environment
    let rules_path = cli
        .rules
        .clone()
        .or_else(|| std::env::var_os(RULES_PATH_ENV).map(PathBuf::from));
    let rules = rules_path.as_deref();

    match cli.command {
        Commands::Serve { port, host } => commands::cmd_serve(rules, &host, port).await,
        Commands::Classify { description } => {
            let engine = commands::load_engine(rules)?;
            commands::cmd_classify(&engine, &description, cli.json).map(|_| ())
        }
        Commands::Receipt { filename } => {
            let engine = commands::load_engine(rules)?;
            commands::cmd_receipt(&engine, &filename, cli.json).map(|_| ())
        }
        Commands::Detect {
            amount,
            category,
            timestamp,
        } => {
            let engine = commands::load_engine(rules)?;
            commands::cmd_detect(&engine, amount, &category, timestamp.as_deref(), cli.json)
                .map(|_| ())
        }
        Commands::Forecast {
            department,
            spent,
            budget,
            days_elapsed,
            total_days,
        } => {
            let engine = commands::load_engine(rules)?;
            commands::cmd_forecast(
                &engine,
                &department,
                spent,
                budget,
                days_elapsed,
                total_days,
                cli.json,
            )
            .map(|_| ())
        }
        Commands::Ask { question } => {
            let engine = commands::load_engine(rules)?;
            commands::cmd_ask(&engine, &question, cli.json).map(|_| ())
        }
        Commands::Rules => commands::cmd_rules(rules),
    }
}
