//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `decide` - Offline decision commands (classify, receipt, detect, forecast, ask)
//! - `rules` - Rule table inspection
//! - `serve` - Web server command

pub mod decide;
pub mod rules;
pub mod serve;

// Re-export command functions for main.rs
pub use decide::*;
pub use rules::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use tally_core::{load_config, ConfigSource, Engine};

/// Load rule tables and build an engine
pub fn load_engine_with_source(rules: Option<&Path>) -> Result<(Engine, ConfigSource)> {
    let (config, source) = load_config(rules).with_context(|| match rules {
        Some(path) => format!("Failed to load rule tables from {}", path.display()),
        None => "Failed to load rule tables".to_string(),
    })?;
    debug!(source = %source, "Rule tables ready");
    Ok((Engine::new(config), source))
}

pub fn load_engine(rules: Option<&Path>) -> Result<Engine> {
    load_engine_with_source(rules).map(|(engine, _)| engine)
}

/// Render a confidence in [0, 1] as a whole percentage
pub fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}
