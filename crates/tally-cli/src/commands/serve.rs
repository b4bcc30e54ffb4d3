//! Server command implementation

use std::path::Path;

use anyhow::Result;

use tally_server::ServerConfig;

use super::load_engine_with_source;

/// Environment variable with comma-separated CORS origins
const ALLOWED_ORIGINS_ENV: &str = "TALLY_ALLOWED_ORIGINS";

pub async fn cmd_serve(rules: Option<&Path>, host: &str, port: u16) -> Result<()> {
    let (engine, rules_source) = load_engine_with_source(rules)?;

    let allowed_origins =
        ServerConfig::parse_origins(&std::env::var(ALLOWED_ORIGINS_ENV).unwrap_or_default());

    println!("🚀 Starting Tally web server...");
    println!("   Rules: {}", rules_source);
    println!("   Listening: http://{}:{}", host, port);
    if allowed_origins.is_empty() {
        println!("   CORS: any origin (set {} to restrict)", ALLOWED_ORIGINS_ENV);
    } else {
        println!("   CORS: {}", allowed_origins.join(", "));
    }
    println!();

    let config = ServerConfig {
        allowed_origins,
        rules_source,
    };

    tally_server::serve(engine, host, port, config).await
}
