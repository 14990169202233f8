use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use querygen::config::{AppConfig, CliArgs};
use querygen::db::dialect::Dialect;
use querygen::db::pool::DbPool;
use querygen::llm::LlmManager;
use querygen::util::logging::init_tracing;
use querygen::web;
use querygen::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load and validate configuration; refuses to start on missing values
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Resolve the dialect descriptor once for the process lifetime
    let dialect = Dialect::from_config(&config.database)?;
    info!("Using {} dialect", dialect.name());

    info!("Connecting to the database");
    let db = DbPool::connect(&config.database, &dialect).await?;

    info!("Binding LLM provider: {}", config.llm.provider);
    let llm = LlmManager::new(&config.llm)?;

    let state = Arc::new(AppState::new(config.clone(), db, llm, dialect));

    info!(
        "Starting querygen server on {}:{}",
        config.web.host, config.web.port
    );
    match web::run_server(config.web, state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(Box::new(e) as Box<dyn std::error::Error>);
        }
    }

    Ok(())
}
