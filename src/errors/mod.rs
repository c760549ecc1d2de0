//! Centralized error handling for the playlist aggregation service
//!
//! This module provides the error taxonomy used across all layers and the
//! containment policy that goes with it:
//!
//! - **Config errors**: an unreadable or malformed sources file is fatal for
//!   the whole request and surfaces as a server error
//! - **Locator errors**: a descriptor whose locator cannot be resolved
//! - **Load errors**: a source unit that cannot be loaded (missing file,
//!   unreadable unit, missing capability, failure while loading)
//! - **Runtime faults**: a loaded unit that fails during initialize/fetch
//!
//! Everything except config errors is contained at the source boundary: the
//! failing source contributes nothing and the aggregation pass continues.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
