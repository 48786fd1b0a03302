//! Show command

use clap::Args;
use rowsnap_engine::normalize_name;
use rowsnap_store::{SnapshotStore, DEFAULT_ROOT};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Snapshot root directory
    #[arg(long, default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    #[arg(long)]
    pub test: String,

    /// Snapshot name; omit to list the test's snapshots
    #[arg(long)]
    pub name: Option<String>,
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::new(args.root.clone());

    let Some(name) = args.name else {
        for name in store.list(&args.test)? {
            println!("{}", name);
        }
        return Ok(());
    };

    let snapshot = store.load(&args.test, &normalize_name(&name)?)?;
    println!("Snapshot {}/{}:", snapshot.test_id, snapshot.name);
    for result in &snapshot.results {
        let kind = if result.is_table() { "table" } else { "query" };
        println!("  {} ({}, {} rows)", result.name(), kind, result.len());
        for col in result.col_types() {
            println!(
                "    {} {} {}",
                col.name(),
                col.full_database_type(),
                col.scan_type().tag()
            );
        }
        for row in result.data() {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            println!("    [{}]", cells.join(", "));
        }
    }
    Ok(())
}
