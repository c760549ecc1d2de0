//! Structured diagnostic report
//!
//! An ordered sequence of timestamped entries, each tagged with an outcome
//! category. The report is created fresh per request and passed explicitly
//! into the components that contribute to it; there is no global mutable
//! reporter state. `tracing` remains the process-wide log.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome category of one report entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Warning,
    Error,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Outcome::Success => "OK",
            Outcome::Warning => "WARN",
            Outcome::Error => "ERROR",
        }
    }
}

/// One timestamped report entry
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
    pub message: String,
}

/// Ordered, per-request diagnostic report
#[derive(Debug, Default, Clone, Serialize)]
pub struct DiagnosticReport {
    entries: Vec<ReportEntry>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, outcome: Outcome, message: String) {
        self.entries.push(ReportEntry {
            timestamp: Utc::now(),
            outcome,
            message,
        });
    }

    /// Record a success-tagged entry
    pub fn success<M: Into<String>>(&mut self, message: M) {
        self.push(Outcome::Success, message.into());
    }

    /// Record a warning-tagged entry
    pub fn warning<M: Into<String>>(&mut self, message: M) {
        self.push(Outcome::Warning, message.into());
    }

    /// Record an error-tagged entry
    pub fn error<M: Into<String>>(&mut self, message: M) {
        self.push(Outcome::Error, message.into());
    }

    /// Entries in recording order
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Number of entries with the given outcome
    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    /// Render the report as plain text, one entry per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!(
                "{} [{}] {}\n",
                entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                entry.outcome.label(),
                entry.message
            ));
        }
        out.push_str(&format!(
            "-- {} entries: {} ok, {} warnings, {} errors\n",
            self.entries.len(),
            self.count(Outcome::Success),
            self.count(Outcome::Warning),
            self.count(Outcome::Error),
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_recording_order() {
        let mut report = DiagnosticReport::new();
        report.success("first");
        report.error("second");
        report.warning("third");

        let messages: Vec<_> = report.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn render_tags_outcomes_and_totals() {
        let mut report = DiagnosticReport::new();
        report.success("network check passed");
        report.error("unit exploded");

        let text = report.render();
        assert!(text.contains("[OK] network check passed"));
        assert!(text.contains("[ERROR] unit exploded"));
        assert!(text.contains("2 entries: 1 ok, 0 warnings, 1 errors"));
    }
}
