//! Record / apply / check harness for database tests
//!
//! A test drives two steps through the harness:
//!
//! 1. [`Harness::initial`] seeds the database from a recorded table
//!    snapshot (or records one from the current tables).
//! 2. [`Harness::check_queries`] compares fresh query results with a
//!    recorded query snapshot (or records one).
//!
//! Snapshots live under `<root>/<test_id>/<name>/`. Snapshot names are
//! normalised with [`normalize_name`].

use crate::names::{normalize_name, validate_name};
use rowsnap_core::errors::{ExError, RowsnapError};
use rowsnap_core::scan::fetch;
use rowsnap_core::{log_op_end, log_op_error, log_op_start};
use rowsnap_core::{
    compare, Database, Diagnosis, Query, QuerySource, ResultSet, Snapshot, Statement,
    StatementBuilder,
};
use rowsnap_store::{ApplyOptions, ApplyStats, Result, SnapshotStore, StoreOptions};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Snapshot name used by [`Harness::initial`] when none is given
pub const DEFAULT_INITIAL_NAME: &str = "initial";

/// What a harness step does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Do nothing
    #[default]
    Skip,
    /// Capture the current state and save it
    Record,
    /// Replay a recorded table snapshot into the database
    Apply,
    /// Compare fresh results with a recorded snapshot
    Check,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Skip => "skip",
            Mode::Record => "record",
            Mode::Apply => "apply",
            Mode::Check => "check",
        };
        f.write_str(s)
    }
}

/// Harness configuration
#[derive(Debug, Clone, Default)]
pub struct HarnessConfig {
    pub store: StoreOptions,
    pub apply: ApplyOptions,
}

/// Arguments for [`Harness::initial`]
#[derive(Debug, Clone, Default)]
pub struct InitialArgs {
    pub mode: Mode,
    /// Snapshot name; empty means [`DEFAULT_INITIAL_NAME`]
    pub name: String,
    /// Tables to record
    pub tables: Vec<String>,
    pub overwrite: bool,
}

/// Arguments for [`Harness::check_queries`]
#[derive(Debug, Clone, Default)]
pub struct CheckArgs {
    pub mode: Mode,
    pub name: String,
    pub queries: Vec<Query>,
    pub overwrite: bool,
}

/// What a harness step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    /// Snapshot saved to this directory
    Recorded(PathBuf),
    Applied(ApplyStats),
    /// Fresh results matched the recording
    Checked,
}

/// Snapshot harness bound to one database and one test
pub struct Harness<'a> {
    db: &'a dyn Database,
    builder: &'a dyn StatementBuilder,
    store: SnapshotStore,
    apply: ApplyOptions,
    test_id: String,
}

impl<'a> Harness<'a> {
    pub fn new(
        db: &'a dyn Database,
        builder: &'a dyn StatementBuilder,
        test_id: impl Into<String>,
        config: HarnessConfig,
    ) -> Self {
        Self {
            db,
            builder,
            store: SnapshotStore::from_options(config.store),
            apply: config.apply,
            test_id: test_id.into(),
        }
    }

    pub fn db(&self) -> &'a dyn Database {
        self.db
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// Seed the database for a test
    ///
    /// - `Skip`: nothing happens
    /// - `Record`: the listed tables are captured and saved
    /// - `Apply`: the recorded snapshot is replayed into the database
    ///
    /// ## Errors
    ///
    /// - `InvalidInput`: `overwrite` outside `Record`, or `Check` mode
    /// - `InvalidName`: the snapshot name is not usable
    /// - `AlreadyExists`: recording over an existing snapshot without `overwrite`
    /// - `NotFound` / `CorruptSnapshot` / `NotATable`: the recording cannot be applied
    pub fn initial(&self, args: InitialArgs) -> Result<Outcome> {
        log_op_start!("initial", mode = %args.mode, snapshot = %args.name);
        let start = Instant::now();

        let result = self.initial_impl(args).map_err(|e| {
            log_op_error!(
                "initial",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "initial",
            duration_ms = start.elapsed().as_millis() as u64,
            outcome = ?result
        );

        Ok(result)
    }

    fn initial_impl(&self, args: InitialArgs) -> Result<Outcome> {
        reject_overwrite("initial", args.mode, args.overwrite)?;
        let name = if args.name.is_empty() {
            DEFAULT_INITIAL_NAME
        } else {
            args.name.as_str()
        };
        let name = normalize_name(name).map_err(|e| ExError::from(e).with_op("initial"))?;

        match args.mode {
            Mode::Skip => {
                tracing::debug!(snapshot = %name, "Skipping initial");
                Ok(Outcome::Skipped)
            }
            Mode::Record => {
                let tables: Vec<&str> = args.tables.iter().map(String::as_str).collect();
                let snapshot = self.snapshot_from_tables(&name, &tables)?;
                let dir = self.store.save(&snapshot, args.overwrite)?;
                Ok(Outcome::Recorded(dir))
            }
            Mode::Apply => self.apply_snapshot(&name).map(Outcome::Applied),
            Mode::Check => Err(invalid_mode("initial", args.mode)),
        }
    }

    /// Check query results against a recorded snapshot
    ///
    /// - `Skip`: nothing happens
    /// - `Record`: the queries are run and their results saved
    /// - `Check`: the recorded snapshot is loaded, each query (with its
    ///   comparators) is attached to the recorded result of the same name,
    ///   the queries are re-run and the two snapshots are compared
    ///
    /// ## Errors
    ///
    /// - `InvalidInput`: `overwrite` outside `Record`, or `Apply` mode
    /// - `InvalidName`: the snapshot or a query name is not usable
    /// - `StructuralMismatch` / `ValueMismatch`: fresh results differ from the recording
    /// - `MissingComparator`: a compared column needs a comparator none of the queries registered
    pub fn check_queries(&self, args: CheckArgs) -> Result<Outcome> {
        log_op_start!(
            "check_queries",
            mode = %args.mode,
            snapshot = %args.name,
            query_count = args.queries.len()
        );
        let start = Instant::now();

        let result = self.check_queries_impl(args).map_err(|e| {
            log_op_error!(
                "check_queries",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "check_queries",
            duration_ms = start.elapsed().as_millis() as u64,
            outcome = ?result
        );

        Ok(result)
    }

    fn check_queries_impl(&self, args: CheckArgs) -> Result<Outcome> {
        reject_overwrite("check_queries", args.mode, args.overwrite)?;
        let name =
            normalize_name(&args.name).map_err(|e| ExError::from(e).with_op("check_queries"))?;

        match args.mode {
            Mode::Skip => {
                tracing::debug!(snapshot = %name, "Skipping check");
                Ok(Outcome::Skipped)
            }
            Mode::Record => {
                let snapshot = self.snapshot_from_queries(&name, &args.queries)?;
                let dir = self.store.save(&snapshot, args.overwrite)?;
                Ok(Outcome::Recorded(dir))
            }
            Mode::Check => {
                let recorded = self.load_snapshot(&name)?;
                let queries: Vec<Arc<Query>> = args.queries.into_iter().map(Arc::new).collect();
                let expect = attach_queries(recorded, &queries)
                    .map_err(|e| ExError::from(e).with_op("check_queries"))?;
                let actual = self.run_queries(&name, &queries)?;

                compare::compare_snapshot(&expect, &actual)
                    .and_then(Diagnosis::into_result)
                    .map_err(|e| ExError::from(e).with_op("check_queries"))?;
                Ok(Outcome::Checked)
            }
            Mode::Apply => Err(invalid_mode("check_queries", args.mode)),
        }
    }

    /// Every row of a table, named after it and flagged as a table result
    ///
    /// ## Errors
    ///
    /// `Query` / `Scan` / `UnsupportedType` from fetching.
    pub fn fetch_table(&self, table: &str) -> Result<ResultSet> {
        self.fetch_query(Arc::new(Query::table(table)))
    }

    /// Run one query and attach it to its result
    ///
    /// ## Errors
    ///
    /// As for [`Harness::fetch_table`].
    pub fn fetch_query(&self, query: Arc<Query>) -> Result<ResultSet> {
        let stmt = match query.source() {
            QuerySource::Sql(sql) => Statement::new(sql.clone()),
            QuerySource::Table => self.builder.select_all(query.name()),
        };
        let result = fetch(self.db, &stmt).map_err(|e| {
            ExError::from(e)
                .with_op("fetch_query")
                .with_entity_id(query.name())
        })?;
        Ok(result.with_query(query))
    }

    /// Capture the listed tables, in order
    ///
    /// ## Errors
    ///
    /// `InvalidName` for a bad snapshot or table name; otherwise as for [`Harness::fetch_table`].
    pub fn snapshot_from_tables(&self, name: &str, tables: &[&str]) -> Result<Snapshot> {
        let queries: Vec<Query> = tables.iter().map(|t| Query::table(*t)).collect();
        self.snapshot_from_queries(name, &queries)
    }

    /// Run the queries, in order, into a snapshot
    ///
    /// ## Errors
    ///
    /// As for [`Harness::snapshot_from_tables`].
    pub fn snapshot_from_queries(&self, name: &str, queries: &[Query]) -> Result<Snapshot> {
        let name =
            normalize_name(name).map_err(|e| ExError::from(e).with_op("snapshot_from_queries"))?;
        let queries: Vec<Arc<Query>> = queries.iter().cloned().map(Arc::new).collect();
        self.run_queries(&name, &queries)
    }

    /// Load a recorded snapshot of this test
    ///
    /// ## Errors
    ///
    /// `InvalidName`, then whatever [`SnapshotStore::load`] reports.
    pub fn load_snapshot(&self, name: &str) -> Result<Snapshot> {
        let name = normalize_name(name).map_err(|e| ExError::from(e).with_op("load_snapshot"))?;
        self.store.load(&self.test_id, &name)
    }

    /// Load a recorded table snapshot and replay it into the database
    ///
    /// ## Errors
    ///
    /// As for [`Harness::load_snapshot`] and [`rowsnap_store::apply_snapshot`].
    pub fn apply_snapshot(&self, name: &str) -> Result<ApplyStats> {
        let snapshot = self.load_snapshot(name)?;
        let stats =
            rowsnap_store::apply_snapshot(self.db, self.builder, &snapshot, &self.apply)?;
        tracing::debug!(
            snapshot = %snapshot.name,
            tables = stats.tables,
            rows = stats.rows,
            "Applied snapshot"
        );
        Ok(stats)
    }

    fn run_queries(&self, name: &str, queries: &[Arc<Query>]) -> Result<Snapshot> {
        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            validate_name(query.name())
                .map_err(|e| ExError::from(e).with_op("run_queries"))?;
            results.push(self.fetch_query(Arc::clone(query))?);
        }
        Ok(Snapshot::new(self.test_id.clone(), name, results))
    }
}

/// Order the recorded results like the queries and attach each query
///
/// Recorded results no query asks for are kept at the end, so the snapshot
/// comparison reports the count difference.
fn attach_queries(recorded: Snapshot, queries: &[Arc<Query>]) -> rowsnap_core::Result<Snapshot> {
    let Snapshot {
        test_id,
        name,
        results,
    } = recorded;
    let mut remaining: Vec<Option<ResultSet>> = results.into_iter().map(Some).collect();

    let mut ordered = Vec::with_capacity(remaining.len());
    for query in queries {
        let slot = remaining
            .iter_mut()
            .find(|r| r.as_ref().is_some_and(|r| r.name() == query.name()));
        match slot.and_then(Option::take) {
            Some(result) => ordered.push(result.with_query(Arc::clone(query))),
            None => {
                return Err(RowsnapError::StructuralMismatch {
                    diagnostic: format!(
                        "check snapshot fail, result name: {}\nresult was not recorded",
                        query.name()
                    ),
                })
            }
        }
    }
    ordered.extend(remaining.into_iter().flatten());

    Ok(Snapshot::new(test_id, name, ordered))
}

fn reject_overwrite(op: &str, mode: Mode, overwrite: bool) -> Result<()> {
    if overwrite && mode != Mode::Record {
        return Err(ExError::from(RowsnapError::InvalidInput {
            reason: format!("overwrite is only allowed in record mode, not {}", mode),
        })
        .with_op(op));
    }
    Ok(())
}

fn invalid_mode(op: &str, mode: Mode) -> ExError {
    ExError::from(RowsnapError::InvalidInput {
        reason: format!("{} mode is not supported here", mode),
    })
    .with_op(op)
}
