//! Core types shared across rowsnap facilities
//!
//! This crate provides the canonical schema constants used by the
//! logging facility and by structured error reporting:
//!
//! - **Field keys**: component, operation, snapshot and result identifiers
//! - **Event names**: start / end / end_error boundaries

pub mod schema;
