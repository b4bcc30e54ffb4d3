//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Rule-based finance decisions with confidence scores
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Heuristic finance decision engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rule table file (defaults to TALLY_RULES_PATH, then the data-dir override,
    /// then the built-in tables)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print decisions as JSON outcome envelopes
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Classify an expense description into an account
    Classify {
        /// Free-text description (e.g. "택시비 정산")
        description: String,
    },

    /// Suggest an account for a receipt file name
    Receipt {
        /// Receipt file name (e.g. "starbucks_coffee.jpg")
        filename: String,
    },

    /// Screen a card transaction for anomalies
    Detect {
        /// Transaction amount
        amount: f64,

        /// Merchant or spending category
        category: String,

        /// Transaction time, as recorded by the card issuer
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Forecast whether a department will exceed its budget
    Forecast {
        /// Department name
        department: String,

        /// Amount spent so far
        spent: f64,

        /// Total budget for the period
        budget: f64,

        /// Days elapsed in the period
        days_elapsed: u32,

        /// Period length in days (defaults to the configured period)
        #[arg(long)]
        total_days: Option<u32>,
    },

    /// Ask the internal policy knowledge base
    Ask {
        /// Question text
        question: String,
    },

    /// Show where rule tables come from and what they contain
    Rules,
}
