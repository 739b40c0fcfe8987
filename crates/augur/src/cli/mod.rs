//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the augur binary.

mod commands;
mod decider;
mod estimate;
mod run;
mod seed;

pub use commands::{Cli, Commands};
pub use decider::StdinDecider;
pub use estimate::estimate;
pub use run::{load_config, run_scoring};
pub use seed::seed;
