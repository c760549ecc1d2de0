//! Diagnostics: per-request reporting and the diagnostic probe
//!
//! [`report`] holds the structured, timestamped report type that doubles as
//! the reporter injected into the aggregation engine; [`probe`] implements
//! the diagnostic mode that checks network reachability and replays the
//! load/execute pipeline with verbose tracing.

pub mod probe;
pub mod report;

pub use probe::DiagnosticProbe;
pub use report::{DiagnosticReport, Outcome, ReportEntry};
