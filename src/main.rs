use batch_ingest::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Batch Ingest - CSV Batch Validation and SQLite Ingestion");
    println!("========================================================");
    println!();
    println!("Validate incoming CSV files by name against a schema document, load the");
    println!("accepted rows into SQLite and export the table as one CSV file.");
    println!();
    println!("USAGE:");
    println!("    batch-ingest <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    train       Run the training stage on a batch directory");
    println!("    predict     Run the prediction stage on a batch directory");
    println!("    schema      Validate a schema document and print it");
    println!("    inspect     Summarise an exported CSV file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Validate and ingest a training batch:");
    println!("    batch-ingest train ./Training_Batch_Files --root ./work");
    println!();
    println!("    # Prediction run with an explicit schema and progress bar:");
    println!("    batch-ingest predict ./Prediction_Batch_Files --schema schema_prediction.json \\");
    println!("                         --progress");
    println!();
    println!("    # Check the exported table against the schema:");
    println!("    batch-ingest inspect ./work/Training_FileFromDB/InputFile.csv \\");
    println!("                         --schema schema_training.json");
    println!();
    println!("For detailed help on any command, use:");
    println!("    batch-ingest <COMMAND> --help");
}
