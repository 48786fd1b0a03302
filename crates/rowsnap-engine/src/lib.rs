//! rowsnap Engine - record/apply/check orchestration
//!
//! Coordinates the core model with the store:
//! - Recording table and query snapshots for a test
//! - Restoring a recorded table snapshot into the database
//! - Checking fresh query results against a recorded snapshot
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for harness operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod clock;
pub mod harness;
pub mod names;

pub use clock::OffsetClock;
pub use harness::{CheckArgs, Harness, HarnessConfig, InitialArgs, Mode, Outcome};
pub use names::normalize_name;
