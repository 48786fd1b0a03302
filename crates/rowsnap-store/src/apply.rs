//! Replay of table snapshots into a live database
//!
//! Each table is truncated, then its rows are inserted in fixed-size
//! batches. A batch never binds more parameters than the dialect allows,
//! so wide tables get fewer rows per INSERT. By default there is no
//! transaction: the first failure returns immediately and leaves the
//! current table partially loaded. With
//! `atomic`, the whole snapshot runs inside BEGIN/COMMIT and is rolled back
//! on failure.

use crate::errors::{invalid_input, Result};
use rowsnap_core::errors::{ExError, RowsnapError};
use rowsnap_core::{Database, ResultSet, Snapshot, StatementBuilder};

/// Rows per INSERT statement
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Apply configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    pub batch_size: usize,
    pub atomic: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            atomic: false,
        }
    }
}

/// What an apply did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub tables: usize,
    pub rows: usize,
    pub statements: usize,
}

/// Replay every result of a snapshot
///
/// All results are checked before any statement is issued.
///
/// ## Errors
///
/// - `NotATable`: some result was not produced by a table scan (no statements issued)
/// - `InvalidInput`: `batch_size` is zero
/// - `Query`: a statement failed
pub fn apply_snapshot(
    db: &dyn Database,
    builder: &dyn StatementBuilder,
    snapshot: &Snapshot,
    options: &ApplyOptions,
) -> Result<ApplyStats> {
    if options.batch_size == 0 {
        return Err(invalid_input("apply_snapshot", "batch size must be positive"));
    }
    if let Some(r) = snapshot.results.iter().find(|r| !r.is_table()) {
        return Err(not_a_table(r));
    }

    let mut stats = ApplyStats::default();
    if !options.atomic {
        for result in &snapshot.results {
            apply_table(db, builder, result, options.batch_size, &mut stats)?;
        }
        return Ok(stats);
    }

    db.begin().map_err(apply_error)?;
    stats.statements += 1;
    let outcome = snapshot
        .results
        .iter()
        .try_for_each(|result| apply_table(db, builder, result, options.batch_size, &mut stats));
    match outcome {
        Ok(()) => {
            db.commit().map_err(apply_error)?;
            stats.statements += 1;
            Ok(stats)
        }
        Err(err) => {
            if let Err(rollback_err) = db.rollback() {
                tracing::warn!(error = %rollback_err, "Rollback after failed apply also failed");
            }
            Err(err)
        }
    }
}

/// Replay a single table result
///
/// ## Errors
///
/// As for [`apply_snapshot`].
pub fn apply_result(
    db: &dyn Database,
    builder: &dyn StatementBuilder,
    result: &ResultSet,
    batch_size: usize,
) -> Result<ApplyStats> {
    if batch_size == 0 {
        return Err(invalid_input("apply_result", "batch size must be positive"));
    }
    if !result.is_table() {
        return Err(not_a_table(result));
    }
    let mut stats = ApplyStats::default();
    apply_table(db, builder, result, batch_size, &mut stats)?;
    Ok(stats)
}

fn apply_table(
    db: &dyn Database,
    builder: &dyn StatementBuilder,
    result: &ResultSet,
    batch_size: usize,
    stats: &mut ApplyStats,
) -> Result<()> {
    let table = result.name();
    db.exec(&builder.truncate(table)).map_err(apply_error)?;
    stats.statements += 1;

    let columns = result.result_type().column_names();
    for batch in result.data().chunks(rows_per_statement(builder, columns.len(), batch_size)) {
        let stmt = builder.insert(table, &columns, batch).map_err(apply_error)?;
        db.exec(&stmt).map_err(apply_error)?;
        stats.statements += 1;
        stats.rows += batch.len();
    }
    stats.tables += 1;

    tracing::debug!(table = %table, rows = result.len(), "Applied table");
    Ok(())
}

fn rows_per_statement(builder: &dyn StatementBuilder, width: usize, batch_size: usize) -> usize {
    let limit = builder.max_params() / width.max(1);
    batch_size.min(limit).max(1)
}

fn not_a_table(result: &ResultSet) -> ExError {
    ExError::from(RowsnapError::NotATable {
        result: result.name().to_string(),
    })
    .with_op("apply_snapshot")
}

fn apply_error(err: RowsnapError) -> ExError {
    ExError::from(err).with_op("apply_snapshot")
}
