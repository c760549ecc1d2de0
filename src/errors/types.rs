//! Error type definitions for the playlist aggregation service
//!
//! The hierarchy mirrors the pipeline stages: locator resolution, unit
//! loading, and isolated execution each get their own error type, all of
//! which convert into the top-level [`AppError`].

use std::time::Duration;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Top-level configuration errors (sources file missing/unreadable/malformed)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Locator resolution errors
    #[error("Locator error: {0}")]
    Locator(#[from] LocatorError),

    /// Source unit loading errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Faults raised while executing a loaded source unit
    #[error("Runtime fault: {0}")]
    Runtime(#[from] RuntimeFault),

    /// HTTP client errors (diagnostic network checks)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem / IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Locator resolution errors
///
/// Resolution is purely syntactic, so the only failures are malformed input
/// and an unresolvable working directory.
#[derive(Error, Debug)]
pub enum LocatorError {
    /// Empty or whitespace-only locator
    #[error("source '{name}' has an empty locator")]
    Empty { name: String },

    /// Locator that cannot be turned into an absolute path
    #[error("source '{name}' has an unresolvable locator '{locator}': {message}")]
    Unresolvable {
        name: String,
        locator: String,
        message: String,
    },
}

/// Source unit loading errors
///
/// One variant per failure kind the loader can report. Anything the loader
/// catches that does not fit a more specific kind becomes [`LoadError::LoadFailed`].
#[derive(Error, Debug)]
pub enum LoadError {
    /// The resolved path does not exist (or is not a regular file)
    #[error("source unit not found: {path}")]
    NotFound { path: String },

    /// The unit exists but cannot be read or executed
    #[error("source unit unreadable: {path} - {message}")]
    Unreadable { path: String, message: String },

    /// The unit loaded but does not expose the required capability set
    #[error("source unit '{unit}' is missing capability '{capability}'")]
    MissingCapability { unit: String, capability: String },

    /// Any other failure while loading the unit
    #[error("failed to load source unit '{unit}': {message}")]
    LoadFailed { unit: String, message: String },
}

/// Faults raised during isolated execution of a source unit
///
/// Every variant carries the source's display name so a contained fault can
/// be attributed in logs and diagnostic reports.
#[derive(Error, Debug)]
pub enum RuntimeFault {
    /// The unit's initializer failed
    #[error("source '{source_name}' failed during initialize: {message}")]
    InitFailed { source_name: String, message: String },

    /// The unit's content fetch failed
    #[error("source '{source_name}' failed during fetch: {message}")]
    FetchFailed { source_name: String, message: String },

    /// The unit exceeded the per-source execution deadline
    #[error("source '{source_name}' timed out after {timeout:?}")]
    TimedOut { source_name: String, timeout: Duration },

    /// The unit terminated abnormally (panic or killed task)
    #[error("source '{source_name}' aborted unexpectedly: {message}")]
    Aborted { source_name: String, message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is fatal for the whole request
    ///
    /// Only configuration errors abort a pass; every per-source error is
    /// contained at the source boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

impl RuntimeFault {
    /// Attribute a fault raised by the initialize call
    pub fn init<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self::InitFailed {
            source_name: source.into(),
            message: message.into(),
        }
    }

    /// Attribute a fault raised by the fetch call
    pub fn fetch<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self::FetchFailed {
            source_name: source.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_fatal_per_source_errors_are_not() {
        assert!(AppError::config("no sources file").is_fatal());
        assert!(
            !AppError::from(LoadError::NotFound {
                path: "/tmp/missing.src".to_string(),
            })
            .is_fatal()
        );
        assert!(
            !AppError::from(RuntimeFault::fetch("cctv", "connection reset")).is_fatal()
        );
    }

    #[test]
    fn fault_messages_carry_source_name() {
        let fault = RuntimeFault::init("sport", "bad ext config");
        assert!(fault.to_string().contains("sport"));
        assert!(fault.to_string().contains("bad ext config"));
    }
}
