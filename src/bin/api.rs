use day1_lookup::{agent::Orchestrator, api::start_server, config::Day1Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let config = Day1Config::from_env()?;

    info!("Day1 Lookup Orchestrator - API Server");
    info!("Port: {}", config.port);
    info!(
        web_top_k = config.web_top_k,
        max_workers = config.max_workers,
        timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );

    let orchestrator = Arc::new(Orchestrator::from_config(&config)?);

    info!("Orchestrator initialized");

    start_server(orchestrator, config.port).await?;

    Ok(())
}
