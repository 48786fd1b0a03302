//! rowsnap CLI
//!
//! Command-line interface for recording, checking and replaying snapshots
//! of a SQLite database

use clap::{Parser, Subcommand};
use rowsnap_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rowsnap")]
#[command(about = "rowsnap - Snapshot testing for SQL query results", long_about = None)]
struct Cli {
    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record tables and queries into a snapshot
    Record(commands::record::RecordArgs),
    /// Compare fresh query results with a recorded snapshot
    Check(commands::check::CheckArgs),
    /// Replay a recorded table snapshot into the database
    Apply(commands::apply::ApplyArgs),
    /// Print a recorded snapshot
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();
    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Record(args) => commands::record::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Apply(args) => commands::apply::execute(args),
        Commands::Show(args) => commands::show::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
