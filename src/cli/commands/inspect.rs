//! `inspect` command implementation

use super::shared::setup_logging;
use crate::cli::args::InspectArgs;
use crate::dataset::{load_export, summarize};
use crate::schema::Schema;
use anyhow::{Context, Result};
use colored::*;

/// Load an export and print a per-column summary
pub fn run_inspect(args: InspectArgs) -> Result<()> {
    setup_logging(&args.verbosity)?;

    let schema = match &args.schema {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read schema document {}", path.display()))?;
            Some(Schema::from_json(&content, path)?)
        }
        None => None,
    };

    let df = load_export(&args.file, schema.as_ref())?;
    let summary = summarize(&df);

    if args.verbosity.quiet {
        return Ok(());
    }

    println!("{}", args.file.display().to_string().bright_green().bold());
    println!(
        "  {} {}",
        "Rows:".bright_cyan(),
        summary.rows.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Columns:".bright_cyan(),
        summary.columns.len().to_string().bright_white().bold()
    );
    for column in &summary.columns {
        let nulls = if column.nulls > 0 {
            format!("{} nulls", column.nulls).bright_red()
        } else {
            "no nulls".bright_black()
        };
        println!("    {} {} {}", column.name, column.dtype.bright_black(), nulls);
    }
    Ok(())
}
