//! Record command

use super::target::{QueryArgs, TargetArgs};
use clap::Args;
use rowsnap_engine::{CheckArgs, Harness, InitialArgs, Mode, Outcome};
use rowsnap_store::{Dialect, SqlBuilder};

#[derive(Debug, Args)]
pub struct RecordArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub queries: QueryArgs,

    /// Replace an existing snapshot
    #[arg(long)]
    pub overwrite: bool,
}

/// Tables alone record an initial snapshot (default name "initial");
/// anything with a named query records a query snapshot.
pub fn execute(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.queries.is_empty() {
        return Err("Must specify at least one --table or --query".into());
    }

    let db = args.target.open_db()?;
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let harness = Harness::new(&db, &builder, args.target.test.clone(), args.target.config());

    let outcome = if args.queries.queries.is_empty() {
        harness.initial(InitialArgs {
            mode: Mode::Record,
            name: args.target.name.clone(),
            tables: args.queries.tables.clone(),
            overwrite: args.overwrite,
        })?
    } else {
        harness.check_queries(CheckArgs {
            mode: Mode::Record,
            name: args.target.name.clone(),
            queries: args.queries.build()?,
            overwrite: args.overwrite,
        })?
    };

    if let Outcome::Recorded(dir) = outcome {
        println!("Snapshot recorded:");
        println!("  path: {}", dir.display());
    }
    Ok(())
}
