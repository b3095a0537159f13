//! Command implementations for the batch-ingest CLI
//!
//! Each subcommand lives in its own module; this one only dispatches.

pub mod inspect;
pub mod schema;
pub mod shared;
pub mod stage;

use crate::cli::args::{Args, Commands};
use crate::config::Stage;
use anyhow::{Result, bail};

/// Main command runner for batch-ingest
pub fn run(args: Args) -> Result<()> {
    let Some(command) = args.command else {
        bail!("no command given");
    };

    match command {
        Commands::Train(stage_args) => stage::run_stage(Stage::Training, stage_args),
        Commands::Predict(stage_args) => stage::run_stage(Stage::Prediction, stage_args),
        Commands::Schema(schema_args) => schema::run_schema(schema_args),
        Commands::Inspect(inspect_args) => inspect::run_inspect(inspect_args),
    }
}
