//! Augur CLI binary.
//!
//! This binary scores stored headlines through the completion endpoint:
//! - Seed the record store from a tab-separated file
//! - Project the cost of a run without calling the endpoint
//! - Run the rate-limited scoring loop

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, estimate, load_config, run_scoring, seed};

    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            rescore,
            interactive,
            limit,
        } => {
            run_scoring(&config, rescore, interactive, limit).await?;
        }

        Commands::Estimate { rescore } => {
            estimate(&config, rescore).await?;
        }

        Commands::Seed { file } => {
            seed(&config, &file)?;
        }
    }

    Ok(())
}
