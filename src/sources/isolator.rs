//! Execution isolator for loaded source units
//!
//! Drives a loaded unit through its lifecycle (initialize, then fetch)
//! inside a spawned task so that every failure mode a unit can exhibit,
//! including panics and hangs, is converted to a [`RuntimeFault`] instead of
//! propagating into the aggregation pass.

use std::time::Duration;

use crate::errors::RuntimeFault;
use crate::sources::traits::SourceUnit;

/// The result of one isolated unit execution
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Display name of the source that produced the content
    pub source: String,
    /// Diagnostic label of the loaded unit instance
    pub unit_id: String,
    /// Raw playlist text as returned by the unit, unfiltered
    pub content: Option<String>,
}

impl ExecutionOutcome {
    /// Whether the unit contributed any non-whitespace content
    pub fn is_empty(&self) -> bool {
        self.content
            .as_deref()
            .is_none_or(|c| c.trim().is_empty())
    }
}

/// Which lifecycle call a fault came from
enum Stage {
    Initialize,
    Fetch,
}

/// Runs source units under fault containment
#[derive(Debug, Clone)]
pub struct ExecutionIsolator {
    /// Per-source deadline covering initialize and fetch together;
    /// `None` restores the unbounded baseline behavior
    timeout: Option<Duration>,
}

impl ExecutionIsolator {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Execute one unit's lifecycle and capture its output
    ///
    /// `ext` is the descriptor's opaque extra configuration; it is serialized
    /// and forwarded verbatim, never interpreted here.
    pub async fn run(
        &self,
        mut unit: Box<dyn SourceUnit>,
        source_name: &str,
        ext: &serde_json::Value,
    ) -> Result<ExecutionOutcome, RuntimeFault> {
        let config_json = serde_json::to_string(ext)
            .map_err(|e| RuntimeFault::init(source_name, format!("unserializable ext: {e}")))?;

        let unit_id = unit.unit_id().to_string();

        // The unit runs in its own task: a panicking unit surfaces as a
        // JoinError here, and an aborted task drops the unit, which kills
        // the underlying process.
        let mut handle = tokio::spawn(async move {
            if let Err(e) = unit.initialize(&config_json).await {
                return Err((Stage::Initialize, e.to_string()));
            }
            unit.fetch_content(None)
                .await
                .map_err(|e| (Stage::Fetch, e.to_string()))
        });

        let joined = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return Err(RuntimeFault::TimedOut {
                        source_name: source_name.to_string(),
                        timeout,
                    });
                }
            },
            None => (&mut handle).await,
        };

        let result = joined.map_err(|e| RuntimeFault::Aborted {
            source_name: source_name.to_string(),
            message: if e.is_panic() {
                "unit panicked".to_string()
            } else {
                e.to_string()
            },
        })?;

        match result {
            Ok(content) => Ok(ExecutionOutcome {
                source: source_name.to_string(),
                unit_id,
                content,
            }),
            Err((Stage::Initialize, message)) => Err(RuntimeFault::init(source_name, message)),
            Err((Stage::Fetch, message)) => Err(RuntimeFault::fetch(source_name, message)),
        }
    }
}
