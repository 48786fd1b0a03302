//! Structural and value comparison of result sets
//!
//! Comparison is positional and reports only the first point of
//! divergence. Columns whose scan type has no meaningful direct equality
//! (timestamps, raw bytes) must have a [`Comparator`] registered on the
//! query that produced the result.

pub mod comparator;
pub mod engine;

pub use comparator::{Comparator, Comparators, Verdict};
pub use engine::{
    compare_result, compare_result_type, compare_row, compare_snapshot, Diagnosis, Mismatch,
    MismatchKind,
};
