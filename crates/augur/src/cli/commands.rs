//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Augur - score news headlines for their expected market impact
#[derive(Parser, Debug)]
#[command(name = "augur")]
#[command(about = "Score news headlines for market impact through a rate-limited LLM endpoint", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every headline that has no score yet
    Run {
        /// Score every headline again, including scored ones
        #[arg(long)]
        rescore: bool,

        /// Ask on the terminal what to do about rate limits without a retry hint
        #[arg(long)]
        interactive: bool,

        /// Stop after this many headlines
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Project the cost of a run without calling the endpoint
    Estimate {
        /// Include headlines that already have a score
        #[arg(long)]
        rescore: bool,
    },

    /// Load headlines from a tab-separated file (date, headline)
    Seed {
        /// Path to the file
        #[arg(long)]
        file: PathBuf,
    },
}
