use crate::compare::Comparators;
use crate::compare::comparator::direct_eq;
use crate::compare::Verdict;
use crate::errors::{Result, RowsnapError};
use crate::model::{ColType, ResultSet, ResultType, Snapshot, Value};
use std::fmt;

/// Whether a mismatch is in the schema or in the data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    Structural,
    Value,
}

/// First point of divergence between two results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub kind: MismatchKind,
    pub diagnostic: String,
}

impl Mismatch {
    fn structural(diagnostic: String) -> Self {
        Self {
            kind: MismatchKind::Structural,
            diagnostic,
        }
    }

    fn value(diagnostic: String) -> Self {
        Self {
            kind: MismatchKind::Value,
            diagnostic,
        }
    }

    fn prefixed(self, prefix: String) -> Self {
        Self {
            kind: self.kind,
            diagnostic: format!("{}\n{}", prefix, self.diagnostic),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic)
    }
}

impl From<Mismatch> for RowsnapError {
    fn from(m: Mismatch) -> Self {
        match m.kind {
            MismatchKind::Structural => RowsnapError::StructuralMismatch {
                diagnostic: m.diagnostic,
            },
            MismatchKind::Value => RowsnapError::ValueMismatch {
                diagnostic: m.diagnostic,
            },
        }
    }
}

/// Result of a comparison that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnosis {
    Match,
    Mismatch(Mismatch),
}

impl Diagnosis {
    pub fn is_match(&self) -> bool {
        matches!(self, Diagnosis::Match)
    }

    /// Turn a mismatch into its error
    ///
    /// # Errors
    ///
    /// `StructuralMismatch` or `ValueMismatch` carrying the diagnostic.
    pub fn into_result(self) -> Result<()> {
        match self {
            Diagnosis::Match => Ok(()),
            Diagnosis::Mismatch(m) => Err(m.into()),
        }
    }
}

/// Compare two result schemas column by column
pub fn compare_result_type(expect: &ResultType, actual: &ResultType) -> Diagnosis {
    if expect.col_types.len() != actual.col_types.len() {
        return Diagnosis::Mismatch(Mismatch::structural(format!(
            "{} has {} columns, but {} has {} columns",
            expect.name,
            expect.col_types.len(),
            actual.name,
            actual.col_types.len()
        )));
    }

    for (i, (e, a)) in expect.col_types.iter().zip(&actual.col_types).enumerate() {
        if !e.schema_eq(a) {
            return Diagnosis::Mismatch(Mismatch::structural(format!(
                "at index {}, expect column {} ({} {}), actual column {} ({} {})",
                i,
                e.name(),
                e.database_type(),
                e.scan_type(),
                a.name(),
                a.database_type(),
                a.scan_type()
            )));
        }
    }

    Diagnosis::Match
}

/// Compare two results: schema, then row count, then rows in order
///
/// Comparators come from the expected result's query, falling back to the
/// actual result's.
///
/// # Errors
///
/// `MissingComparator` if a timestamp or raw-bytes column has no comparator.
pub fn compare_result(expect: &ResultSet, actual: &ResultSet) -> Result<Diagnosis> {
    if let Diagnosis::Mismatch(m) =
        compare_result_type(expect.result_type(), actual.result_type())
    {
        return Ok(Diagnosis::Mismatch(m));
    }

    let comparators = expect.comparators().or_else(|| actual.comparators());
    ensure_comparators(expect.col_types(), comparators)?;

    if expect.len() != actual.len() {
        return Ok(Diagnosis::Mismatch(Mismatch::value(format!(
            "check result fail: len(rows), expect {}, actual {}",
            expect.len(),
            actual.len()
        ))));
    }

    for (e, a) in expect.data().iter().zip(actual.data()) {
        if let Diagnosis::Mismatch(m) = compare_row(e, a, expect.col_types(), comparators)? {
            return Ok(Diagnosis::Mismatch(
                m.prefixed(format!("check result fail, row: {}", render_row(e))),
            ));
        }
    }

    Ok(Diagnosis::Match)
}

/// Compare one expected row with one actual row
///
/// # Errors
///
/// `MissingComparator` if a timestamp or raw-bytes column has no comparator.
pub fn compare_row(
    expect: &[Value],
    actual: &[Value],
    col_types: &[ColType],
    comparators: Option<&Comparators>,
) -> Result<Diagnosis> {
    if expect.len() != col_types.len() || actual.len() != col_types.len() {
        return Ok(Diagnosis::Mismatch(Mismatch::structural(format!(
            "check row fail: {} columns, expect row has {} values, actual row has {}",
            col_types.len(),
            expect.len(),
            actual.len()
        ))));
    }

    for ((e, a), col) in expect.iter().zip(actual).zip(col_types) {
        if let Some(cmp) = comparators.and_then(|m| m.get(col.name())) {
            if let Verdict::Differs(d) = cmp.compare(e, a) {
                return Ok(Diagnosis::Mismatch(Mismatch::value(format!(
                    "check row fail, col: {}, {}",
                    col.name(),
                    d
                ))));
            }
            continue;
        }

        if col.scan_type().requires_comparator() {
            return Err(missing_comparator(col));
        }

        if !direct_eq(e, a) {
            return Ok(Diagnosis::Mismatch(Mismatch::value(format!(
                "check row fail, col: {}, expect: {}, actual: {}",
                col.name(),
                e,
                a
            ))));
        }
    }

    Ok(Diagnosis::Match)
}

/// Compare two snapshots result by result, in order
///
/// # Errors
///
/// `MissingComparator` as for [`compare_result`].
pub fn compare_snapshot(expect: &Snapshot, actual: &Snapshot) -> Result<Diagnosis> {
    if expect.results.len() != actual.results.len() {
        return Ok(Diagnosis::Mismatch(Mismatch::structural(format!(
            "check snapshot fail: len(results), expect {}, actual {}",
            expect.results.len(),
            actual.results.len()
        ))));
    }

    for (e, a) in expect.results.iter().zip(&actual.results) {
        if let Diagnosis::Mismatch(m) = compare_result(e, a)? {
            return Ok(Diagnosis::Mismatch(
                m.prefixed(format!("check snapshot fail, result name: {}", e.name())),
            ));
        }
    }

    Ok(Diagnosis::Match)
}

fn ensure_comparators(col_types: &[ColType], comparators: Option<&Comparators>) -> Result<()> {
    for col in col_types {
        let registered = comparators.is_some_and(|m| m.contains_key(col.name()));
        if col.scan_type().requires_comparator() && !registered {
            return Err(missing_comparator(col));
        }
    }
    Ok(())
}

fn missing_comparator(col: &ColType) -> RowsnapError {
    RowsnapError::MissingComparator {
        column: col.name().to_string(),
        scan_type: col.scan_type().tag().to_string(),
    }
}

fn render_row(values: &[Value]) -> String {
    let cells: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", cells.join(", "))
}
