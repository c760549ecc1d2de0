//! Diagnostic probe
//!
//! Exercises the parts of the system most likely to fail in deployment:
//! outbound network reachability first, then a verbose replay of the full
//! load/execute pipeline for every configured source. The probe is purely
//! observational; it produces a report, never a playlist, and it always
//! runs to completion regardless of how many checks fail.

use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::diagnostics::report::DiagnosticReport;
use crate::models::SourceDescriptor;
use crate::pipeline::aggregator::filter_lines;
use crate::sources::isolator::ExecutionIsolator;
use crate::sources::loader::UnitLoader;
use crate::sources::locator;

/// Substrings that flag a playlist line as suspicious during replay
const ERROR_INDICATORS: &[&str] = &["error", "fail", "exception"];

/// Network and pipeline diagnostics
pub struct DiagnosticProbe {
    client: reqwest::Client,
    ip_echo_url: String,
    loader: Arc<dyn UnitLoader>,
    isolator: ExecutionIsolator,
}

impl DiagnosticProbe {
    pub fn new(
        client: reqwest::Client,
        ip_echo_url: String,
        loader: Arc<dyn UnitLoader>,
        isolator: ExecutionIsolator,
    ) -> Self {
        Self {
            client,
            ip_echo_url,
            loader,
            isolator,
        }
    }

    /// Run all checks in order: network first, then per-source replay
    pub async fn run(&self, descriptors: &[SourceDescriptor]) -> DiagnosticReport {
        let mut report = DiagnosticReport::new();

        report.success(format!(
            "diagnostics started for {} configured source(s)",
            descriptors.len()
        ));

        self.check_endpoint(&mut report, "ip-echo", &self.ip_echo_url)
            .await;

        let mut probed = vec![self.ip_echo_url.clone()];
        for descriptor in descriptors {
            if let Some(origin) = upstream_origin(&descriptor.ext) {
                if probed.contains(&origin) {
                    continue;
                }
                probed.push(origin.clone());
                let label = format!("upstream of '{}'", descriptor.name);
                self.check_endpoint(&mut report, &label, &origin).await;
            }
        }

        for descriptor in descriptors {
            self.replay_source(&mut report, descriptor).await;
        }

        report.success("diagnostics finished");
        report
    }

    /// One reachability check: latency, HTTP status, and body size
    async fn check_endpoint(&self, report: &mut DiagnosticReport, label: &str, url: &str) {
        let started = Instant::now();
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                let size = response.bytes().await.map(|b| b.len()).unwrap_or(0);
                let latency = started.elapsed().as_millis();
                let message = format!(
                    "reachability {label} ({url}): status {status}, {size} bytes in {latency}ms"
                );
                if status.is_success() {
                    report.success(message);
                } else {
                    report.warning(message);
                }
            }
            Err(e) => {
                report.error(format!("reachability {label} ({url}) failed: {e}"));
            }
        }
    }

    /// Replay resolve/load/execute for one source with per-step trace capture
    async fn replay_source(&self, report: &mut DiagnosticReport, descriptor: &SourceDescriptor) {
        let resolved = match locator::resolve(descriptor) {
            Ok(resolved) => {
                report.success(format!(
                    "source '{}' resolved to {resolved}",
                    descriptor.name
                ));
                resolved
            }
            Err(e) => {
                report.error(format!("source '{}' locator failed: {e}", descriptor.name));
                return;
            }
        };

        let unit = match self.loader.load(&resolved).await {
            Ok(unit) => {
                report.success(format!(
                    "source '{}' loaded as unit '{}'",
                    descriptor.name,
                    unit.unit_id()
                ));
                unit
            }
            Err(e) => {
                report.error(format!("source '{}' load failed: {e}", descriptor.name));
                return;
            }
        };

        let outcome = match self
            .isolator
            .run(unit, &descriptor.name, &descriptor.ext)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                report.error(format!(
                    "source '{}' execution failed: {e}",
                    descriptor.name
                ));
                return;
            }
        };

        if outcome.is_empty() {
            report.warning(format!("source '{}' returned no content", descriptor.name));
            return;
        }

        let content = outcome.content.as_deref().unwrap_or("");
        let raw_lines = content.lines().count();
        let filtered = filter_lines(content);
        report.success(format!(
            "source '{}' produced {raw_lines} raw lines, {} after filtering, ~{} channels",
            descriptor.name,
            filtered.len(),
            filtered.len() / 2
        ));

        // Pairing is not enforced by the engine; flag the smell here instead.
        if filtered.len() % 2 != 0 {
            report.warning(format!(
                "source '{}' has an odd filtered line count ({}); metadata/URL pairing may be broken",
                descriptor.name,
                filtered.len()
            ));
        }

        for line in &filtered {
            let lowered = line.to_lowercase();
            if ERROR_INDICATORS.iter().any(|needle| lowered.contains(needle)) {
                report.warning(format!(
                    "source '{}' suspicious output line: {line}",
                    descriptor.name
                ));
            }
        }
    }
}

/// Best-effort guess of a source's upstream origin from its opaque ext block
///
/// The ext block is never interpreted by the pipeline, but for reachability
/// checks the first http(s) URL found anywhere in it is close enough to the
/// unit's likely upstream host.
fn upstream_origin(ext: &serde_json::Value) -> Option<String> {
    first_http_url(ext).and_then(|raw| {
        let url = Url::parse(&raw).ok()?;
        url.host_str()?;
        Some(format!(
            "{}://{}{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.port()
                .map(|p| format!(":{p}"))
                .unwrap_or_default()
        ))
    })
}

fn first_http_url(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
                .then(|| trimmed.to_string())
        }
        serde_json::Value::Array(items) => items.iter().find_map(first_http_url),
        serde_json::Value::Object(map) => map.values().find_map(first_http_url),
        _ => None,
    }
}
