//! Apply command

use super::target::TargetArgs;
use clap::Args;
use rowsnap_engine::{Harness, InitialArgs, Mode, Outcome};
use rowsnap_store::{ApplyOptions, Dialect, SqlBuilder, DEFAULT_BATCH_SIZE};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Run the whole replay in one transaction
    #[arg(long)]
    pub atomic: bool,

    /// Rows per INSERT statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

pub fn execute(args: ApplyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = args.target.open_db()?;
    let builder = SqlBuilder::new(Dialect::Sqlite);
    let mut config = args.target.config();
    config.apply = ApplyOptions {
        batch_size: args.batch_size,
        atomic: args.atomic,
    };
    let harness = Harness::new(&db, &builder, args.target.test.clone(), config);

    let outcome = harness.initial(InitialArgs {
        mode: Mode::Apply,
        name: args.target.name.clone(),
        tables: Vec::new(),
        overwrite: false,
    })?;

    if let Outcome::Applied(stats) = outcome {
        println!("Snapshot applied:");
        println!("  tables: {}", stats.tables);
        println!("  rows: {}", stats.rows);
        println!("  statements: {}", stats.statements);
    }
    Ok(())
}
