//! Aggregation engine
//!
//! Merges the output of all configured source units into one playlist
//! document. Sources are processed strictly sequentially in config order,
//! which fixes the channel order of the final document. Every per-source
//! failure is contained at the source boundary: it is logged, recorded in
//! the injected report, and degrades that source's contribution to nothing.

use std::sync::Arc;

use crate::diagnostics::DiagnosticReport;
use crate::errors::AppResult;
use crate::models::SourceDescriptor;
use crate::pipeline::cache::ContentCache;
use crate::sources::isolator::ExecutionIsolator;
use crate::sources::loader::UnitLoader;
use crate::sources::locator;

/// Directive marker every output document begins with, exactly once
pub const PLAYLIST_HEADER: &str = "#EXTM3U";

/// The merged playlist document
#[derive(Debug, Clone)]
pub struct AggregationResult {
    lines: Vec<String>,
}

impl AggregationResult {
    fn new() -> Self {
        Self {
            lines: vec![PLAYLIST_HEADER.to_string()],
        }
    }

    /// All lines including the leading directive marker
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Channel lines contributed by sources (everything after the marker)
    pub fn channel_line_count(&self) -> usize {
        self.lines.len() - 1
    }

    /// Render the document as newline-joined text
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Filter one source's raw content into mergeable playlist lines
///
/// Drops whitespace-only lines and any line re-declaring the directive
/// marker, so merging N sources yields exactly one leading marker no matter
/// how many sources embed their own. Idempotent: filtering already-filtered
/// output changes nothing.
pub fn filter_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.contains(PLAYLIST_HEADER))
        .map(|line| line.to_string())
        .collect()
}

/// Merges source unit output into a single playlist document
pub struct AggregationEngine {
    loader: Arc<dyn UnitLoader>,
    isolator: ExecutionIsolator,
    cache: Arc<ContentCache>,
    /// When true (the default), every pass loads and executes every unit
    /// fresh; when false, unchanged units are served from the content cache
    reload_every_request: bool,
    /// Emit a comment line naming a failed source instead of dropping it
    /// silently (the permissive variant)
    include_failure_markers: bool,
}

impl AggregationEngine {
    pub fn new(
        loader: Arc<dyn UnitLoader>,
        isolator: ExecutionIsolator,
        cache: Arc<ContentCache>,
        reload_every_request: bool,
        include_failure_markers: bool,
    ) -> Self {
        Self {
            loader,
            isolator,
            cache,
            reload_every_request,
            include_failure_markers,
        }
    }

    /// Run one full aggregation pass
    ///
    /// Never fails: a descriptor whose resolve/load/run chain errors out
    /// contributes nothing (or a failure marker), and the pass continues
    /// with the next descriptor.
    pub async fn aggregate(
        &self,
        descriptors: &[SourceDescriptor],
        report: &mut DiagnosticReport,
    ) -> AggregationResult {
        let mut result = AggregationResult::new();

        for descriptor in descriptors {
            match self.execute_source(descriptor).await {
                Ok(content) => {
                    let lines = filter_lines(content.as_deref().unwrap_or(""));
                    if lines.is_empty() {
                        tracing::warn!(source = %descriptor.name, "source returned no content");
                        report.warning(format!("source '{}' returned no content", descriptor.name));
                    } else {
                        tracing::info!(
                            source = %descriptor.name,
                            lines = lines.len(),
                            channels = lines.len() / 2,
                            "source merged"
                        );
                        report.success(format!(
                            "source '{}' contributed {} lines (~{} channels)",
                            descriptor.name,
                            lines.len(),
                            lines.len() / 2
                        ));
                        result.lines.extend(lines);
                    }
                }
                Err(e) => {
                    tracing::error!(source = %descriptor.name, error = %e, "source failed");
                    report.error(format!("source '{}' failed: {e}", descriptor.name));
                    if self.include_failure_markers {
                        result
                            .lines
                            .push(format!("# source {} failed", descriptor.name));
                    }
                }
            }
        }

        result
    }

    /// Resolve, load, and execute one source, honoring the reload policy
    pub async fn execute_source(
        &self,
        descriptor: &SourceDescriptor,
    ) -> AppResult<Option<String>> {
        let resolved = locator::resolve(descriptor)?;

        let file_digest = if self.reload_every_request {
            None
        } else {
            // An unreadable file falls through to the loader, which reports
            // the proper failure kind.
            match tokio::fs::read(resolved.path()).await {
                Ok(bytes) => {
                    let digest = ContentCache::digest(&bytes);
                    if let Some(content) = self.cache.get(resolved.path(), &digest).await {
                        tracing::debug!(source = %descriptor.name, "serving cached content");
                        return Ok(Some(content));
                    }
                    Some(digest)
                }
                Err(_) => None,
            }
        };

        let unit = self.loader.load(&resolved).await?;
        let outcome = self
            .isolator
            .run(unit, &descriptor.name, &descriptor.ext)
            .await?;

        if let (Some(digest), Some(content)) = (file_digest, outcome.content.as_ref()) {
            if !content.trim().is_empty() {
                self.cache
                    .insert(resolved.path(), digest, content.clone())
                    .await;
            }
        }

        Ok(outcome.content)
    }
}
