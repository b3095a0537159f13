//! Shared components for CLI commands
//!
//! Logging setup and console reporting used by every subcommand.

use crate::cli::args::Verbosity;
use crate::constants::LOG_TARGET;
use crate::models::{RunStats, TableOutcome};
use anyhow::{Result, anyhow};
use colored::*;
use std::time::Duration;
use tracing::debug;

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the verbosity flags.
pub fn setup_logging(verbosity: &Verbosity) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = verbosity.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, log_level)));

    let result = if verbosity.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| anyhow!("failed to initialise logging: {}", e))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Format a duration the way the summaries print it
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

fn describe_table(outcome: TableOutcome) -> &'static str {
    match outcome {
        TableOutcome::Created => "created",
        TableOutcome::AlreadyExists => "reused",
        TableOutcome::Recreated => "recreated",
    }
}

/// Print the end-of-run summary
pub fn print_run_summary(stats: &RunStats) {
    println!(
        "\n{}",
        format!("{} Run Summary", stats.stage).bright_green().bold()
    );
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        format_duration(stats.elapsed).bright_white()
    );
    println!(
        "  {} {}",
        "Files seen:".bright_cyan(),
        stats.files_seen.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Good files:".bright_cyan(),
        stats.files_good.to_string().bright_white()
    );
    if stats.files_bad > 0 {
        println!(
            "  {} {}",
            "Bad files:".bright_red(),
            stats.files_bad.to_string().bright_red().bold()
        );
    }
    if stats.files_quarantined > 0 {
        println!(
            "  {} {}",
            "Quarantined:".bright_red(),
            stats.files_quarantined.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Rows inserted:".bright_cyan(),
        stats.rows_inserted.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Table:".bright_cyan(),
        describe_table(stats.table)
    );
    if let Some(entry) = &stats.archive.entry {
        println!(
            "  {} {} ({} files)",
            "Archive:".bright_cyan(),
            entry.display(),
            stats.archive.files_archived
        );
    }
    println!(
        "  {} {} ({} rows)",
        "Export:".bright_cyan(),
        stats.export.path.display(),
        stats.export.rows
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1_500)), "1.50s");
    }

    #[test]
    fn test_describe_table() {
        assert_eq!(describe_table(TableOutcome::AlreadyExists), "reused");
        assert_eq!(describe_table(TableOutcome::Recreated), "recreated");
    }
}
