//! `schema` command implementation

use super::shared::setup_logging;
use crate::cli::args::SchemaArgs;
use crate::schema::Schema;
use anyhow::{Context, Result};
use colored::*;

/// Check a schema document and print what it describes
pub fn run_schema(args: SchemaArgs) -> Result<()> {
    setup_logging(&args.verbosity)?;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read schema document {}", args.file.display()))?;
    let schema = Schema::from_json(&content, &args.file)?;

    if args.verbosity.quiet {
        return Ok(());
    }

    println!("{}", "Schema is valid".bright_green().bold());
    println!(
        "  {} {}",
        "Sample file:".bright_cyan(),
        schema.sample_file_name()
    );
    println!(
        "  {} {}",
        "File pattern:".bright_cyan(),
        schema.filename_pattern()
    );
    println!(
        "  {} {} / {}",
        "Date/time stamp lengths:".bright_cyan(),
        schema.date_stamp_length(),
        schema.time_stamp_length()
    );
    println!(
        "  {} {}",
        "Columns:".bright_cyan(),
        schema.column_count().to_string().bright_white().bold()
    );
    for column in schema.columns() {
        println!("    {} {}", column.name, column.sql_type.bright_black());
    }
    Ok(())
}
