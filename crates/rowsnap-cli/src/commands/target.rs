//! Arguments shared by every subcommand, and query flag parsing

use clap::Args;
use rowsnap_core::{Comparator, Query};
use rowsnap_engine::HarnessConfig;
use rowsnap_store::{SqliteDatabase, StoreOptions, DEFAULT_ROOT};
use std::path::PathBuf;

/// Which database, and which recorded snapshot
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// SQLite database file
    #[arg(long)]
    pub db: PathBuf,

    /// Snapshot root directory
    #[arg(long, default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// Test the snapshot belongs to; '/' separates nested directories
    #[arg(long)]
    pub test: String,

    /// Snapshot name
    #[arg(long, default_value = "")]
    pub name: String,
}

impl TargetArgs {
    pub fn open_db(&self) -> Result<SqliteDatabase, Box<dyn std::error::Error>> {
        if !self.db.is_file() {
            return Err(format!("database file {} does not exist", self.db.display()).into());
        }
        Ok(SqliteDatabase::open(&self.db)?)
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            store: StoreOptions {
                root: self.root.clone(),
            },
            ..HarnessConfig::default()
        }
    }
}

/// Tables, named queries and per-column comparators
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Table to capture in full (repeatable)
    #[arg(long = "table")]
    pub tables: Vec<String>,

    /// Named query as NAME=SQL (repeatable)
    #[arg(long = "query", value_parser = parse_query)]
    pub queries: Vec<(String, String)>,

    /// Comparator as RESULT.COLUMN=KIND, KIND one of exact, time_equal,
    /// time_after, raw_bytes (repeatable)
    #[arg(long = "comparator", value_parser = parse_comparator)]
    pub comparators: Vec<ComparatorSpec>,
}

#[derive(Debug, Clone)]
pub struct ComparatorSpec {
    pub result: String,
    pub column: String,
    pub kind: String,
}

impl QueryArgs {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.queries.is_empty()
    }

    /// Tables first, then named queries, each with its comparators
    pub fn build(&self) -> Result<Vec<Query>, Box<dyn std::error::Error>> {
        let mut queries: Vec<Query> = self
            .tables
            .iter()
            .map(Query::table)
            .chain(self.queries.iter().map(|(name, sql)| Query::new(name, sql)))
            .collect();

        for spec in &self.comparators {
            let comparator = Comparator::from_name(&spec.kind)
                .ok_or_else(|| format!("unknown comparator kind {:?}", spec.kind))?;
            let query = queries
                .iter_mut()
                .find(|q| q.name() == spec.result)
                .ok_or_else(|| format!("comparator for unknown result {:?}", spec.result))?;
            query.register_comparator(spec.column.clone(), comparator);
        }

        Ok(queries)
    }
}

fn parse_query(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, sql)) if !name.trim().is_empty() && !sql.trim().is_empty() => {
            Ok((name.trim().to_string(), sql.trim().to_string()))
        }
        _ => Err(format!("expected NAME=SQL, got {:?}", s)),
    }
}

fn parse_comparator(s: &str) -> Result<ComparatorSpec, String> {
    let parsed = s.split_once('=').and_then(|(target, kind)| {
        let (result, column) = target.split_once('.')?;
        Some(ComparatorSpec {
            result: result.trim().to_string(),
            column: column.trim().to_string(),
            kind: kind.trim().to_string(),
        })
    });
    match parsed {
        Some(spec) if !spec.result.is_empty() && !spec.column.is_empty() => Ok(spec),
        _ => Err(format!("expected RESULT.COLUMN=KIND, got {:?}", s)),
    }
}
