//! Stockwatch CLI
//!
//! Command-line interface for the stock availability monitoring service.

use std::path::PathBuf;

use clap::Parser;
use stockwatch::load_config;
use tracing::Level;

#[derive(Parser)]
#[command(name = "stockwatch")]
#[command(about = "Shop stock availability monitoring and webhook notification service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!("Loading configuration from {:?}", args.config);
    let config = load_config(&args.config)?;
    tracing::info!(
        "Loaded {} target(s) from {:?}",
        config.targets.len(),
        args.config
    );

    stockwatch::run(config).await?;

    Ok(())
}
