//! Check command

use super::target::{QueryArgs, TargetArgs};
use clap::Args;
use rowsnap_engine::{CheckArgs as HarnessCheckArgs, Harness, Mode};
use rowsnap_store::{Dialect, SqlBuilder};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub queries: QueryArgs,
}

pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.queries.is_empty() {
        return Err("Must specify at least one --table or --query".into());
    }

    let db = args.target.open_db()?;
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let harness = Harness::new(&db, &builder, args.target.test.clone(), args.target.config());

    let queries = args.queries.build()?;
    let count = queries.len();
    harness.check_queries(HarnessCheckArgs {
        mode: Mode::Check,
        name: args.target.name.clone(),
        queries,
        overwrite: false,
    })?;

    println!("Snapshot matches:");
    println!("  results: {}", count);
    Ok(())
}
