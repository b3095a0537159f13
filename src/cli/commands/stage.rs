//! `train` and `predict` command implementation

use super::shared::{print_run_summary, setup_logging};
use crate::cli::args::StageArgs;
use crate::config::Stage;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use colored::*;
use tracing::info;

/// Run one stage of the pipeline on the given batch
pub fn run_stage(stage: Stage, args: StageArgs) -> Result<()> {
    setup_logging(&args.verbosity)?;

    let config = args
        .build_config(stage)
        .context("invalid configuration")?;
    let quiet = args.verbosity.quiet;

    if !quiet {
        println!(
            "{}",
            format!("Starting {} validation", stage).bright_green().bold()
        );
        println!(
            "  {} {}",
            "Batch:".bright_cyan(),
            args.batch_dir.display()
        );
        println!(
            "  {} {}",
            "Schema:".bright_cyan(),
            config.schema_path().display()
        );
    }
    info!("Running {} stage with {:?}", stage, config);

    let pipeline = Pipeline::new(config)?;
    let stats = pipeline
        .run(&args.batch_dir)
        .with_context(|| format!("{} run failed", stage))?;

    if !quiet {
        print_run_summary(&stats);
    }
    Ok(())
}
