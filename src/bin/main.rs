use clap::Parser;
use day1_lookup::{agent::Orchestrator, config::Day1Config, models::ExecutionPlan};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run one lookup and print the normalized result as JSON
#[derive(Debug, Parser)]
#[command(name = "orchestrator", version)]
struct Cli {
    /// Free-text query, e.g. "AAPL outlook"
    query: String,

    /// Skip the web search lookup
    #[arg(long)]
    no_web: bool,

    /// Skip the quote lookup
    #[arg(long)]
    no_quotes: bool,

    /// Instrument identifier to quote and profile (repeatable)
    #[arg(short = 't', long = "ticker")]
    tickers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Day1Config::from_env()?;

    info!("Day1 lookup orchestrator starting");

    let orchestrator = Orchestrator::from_config(&config)?;
    let plan = ExecutionPlan::new(!cli.no_web, !cli.no_quotes, cli.tickers);

    let result = orchestrator.run(&cli.query, &plan).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
