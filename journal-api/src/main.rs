//! Journal API - Main entry point.

use anyhow::Result;
use journal_common::config::Config;
use journal_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Journal API v{}", env!("CARGO_PKG_VERSION"));

    if config.llm.api_key.is_none() {
        tracing::warn!("No LLM API key configured; analysis requests will fail");
    }

    // Start the server
    journal_api::start_server(&config).await
}
