//! # DutyBot Core
//!
//! Domain types shared by every DutyBot crate: the duty `Assignment` model,
//! the rendered `ScheduleRow`, the `DutyError` taxonomy, date text formats,
//! and the plain-text table formatter used for chat replies.
//!
//! This crate is deliberately free of I/O; storage, networking and
//! scheduling live in the sibling crates.

/// Date parsing, formatting and weekday helpers
pub mod dates;
/// Error taxonomy shared across the workspace
pub mod errors;
/// Domain models (assignments and schedule rows)
pub mod models;
/// Column-aligned plain-text tables for chat output
pub mod table;
