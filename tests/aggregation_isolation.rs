//! Aggregation engine properties: isolation, ordering, marker handling,
//! empty-content handling, and the reload/caching policy. Source units are
//! scripted in-memory implementations injected through the loader seam, so
//! these tests exercise the engine and isolator without child processes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use m3u_aggregator::diagnostics::{DiagnosticReport, Outcome};
use m3u_aggregator::errors::{AppError, AppResult, LoadError};
use m3u_aggregator::models::SourceDescriptor;
use m3u_aggregator::pipeline::{AggregationEngine, ContentCache, PLAYLIST_HEADER};
use m3u_aggregator::sources::{ExecutionIsolator, SourceUnit, UnitLoader};
use m3u_aggregator::sources::locator::ResolvedLocator;

#[derive(Clone, Debug)]
enum Behavior {
    Content(String),
    Empty,
    FetchError(String),
    Panic,
    Hang,
}

#[derive(Debug)]
struct ScriptedUnit {
    id: String,
    behavior: Behavior,
}

#[async_trait]
impl SourceUnit for ScriptedUnit {
    fn unit_id(&self) -> &str {
        &self.id
    }

    async fn initialize(&mut self, _config_json: &str) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_content(&mut self, _channel_id: Option<&str>) -> AppResult<Option<String>> {
        match &self.behavior {
            Behavior::Content(content) => Ok(Some(content.clone())),
            Behavior::Empty => Ok(None),
            Behavior::FetchError(message) => Err(AppError::internal(message.clone())),
            Behavior::Panic => panic!("scripted unit panic"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

/// Loader keyed by the locator's file label; unknown labels report NotFound
struct ScriptedLoader {
    units: HashMap<String, Behavior>,
    loads: AtomicUsize,
}

impl ScriptedLoader {
    fn new(units: Vec<(&str, Behavior)>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|(label, behavior)| (label.to_string(), behavior))
                .collect(),
            loads: AtomicUsize::new(0),
        }
    }

    fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitLoader for ScriptedLoader {
    async fn load(&self, locator: &ResolvedLocator) -> Result<Box<dyn SourceUnit>, LoadError> {
        let label = locator.file_label();
        match self.units.get(&label) {
            Some(behavior) => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ScriptedUnit {
                    id: format!("{label}-test"),
                    behavior: behavior.clone(),
                }))
            }
            None => Err(LoadError::NotFound {
                path: locator.to_string(),
            }),
        }
    }
}

fn descriptor(name: &str, api: &str) -> SourceDescriptor {
    SourceDescriptor {
        name: name.to_string(),
        api: api.to_string(),
        ext: serde_json::json!({}),
    }
}

fn engine_with(
    loader: Arc<ScriptedLoader>,
    timeout: Duration,
    reload_every_request: bool,
    include_failure_markers: bool,
) -> AggregationEngine {
    AggregationEngine::new(
        loader,
        ExecutionIsolator::new(Some(timeout)),
        Arc::new(ContentCache::new()),
        reload_every_request,
        include_failure_markers,
    )
}

#[tokio::test]
async fn faulting_sources_do_not_affect_the_pass() {
    let loader = Arc::new(ScriptedLoader::new(vec![
        (
            "a",
            Behavior::Content("#EXTINF:-1,Chan1\nhttp://x/1".to_string()),
        ),
        ("b", Behavior::FetchError("upstream down".to_string())),
        ("c", Behavior::Panic),
        (
            "d",
            Behavior::Content("#EXTINF:-1,Chan9\nhttp://x/9".to_string()),
        ),
    ]));
    let engine = engine_with(Arc::clone(&loader), Duration::from_secs(5), true, false);

    let descriptors = vec![
        descriptor("A", "/units/a.src"),
        descriptor("B", "/units/b.src"),
        descriptor("C", "/units/c.src"),
        descriptor("D", "/units/d.src"),
    ];

    let mut report = DiagnosticReport::new();
    let result = engine.aggregate(&descriptors, &mut report).await;

    assert_eq!(
        result.lines(),
        &[
            PLAYLIST_HEADER,
            "#EXTINF:-1,Chan1",
            "http://x/1",
            "#EXTINF:-1,Chan9",
            "http://x/9",
        ]
    );
    assert_eq!(report.count(Outcome::Error), 2);
}

#[tokio::test]
async fn missing_unit_degrades_to_a_valid_document() {
    let loader = Arc::new(ScriptedLoader::new(vec![(
        "a",
        Behavior::Content("#EXTINF:-1,Chan1\nhttp://x/1".to_string()),
    )]));
    let engine = engine_with(loader, Duration::from_secs(5), true, false);

    let descriptors = vec![
        descriptor("A", "/units/a.src"),
        descriptor("B", "/units/missing.src"),
    ];

    let mut report = DiagnosticReport::new();
    let result = engine.aggregate(&descriptors, &mut report).await;

    assert_eq!(
        result.render(),
        "#EXTM3U\n#EXTINF:-1,Chan1\nhttp://x/1"
    );
    assert_eq!(report.count(Outcome::Error), 1);
}

#[tokio::test]
async fn empty_source_contributes_nothing_and_warns() {
    let loader = Arc::new(ScriptedLoader::new(vec![("a", Behavior::Empty)]));
    let engine = engine_with(loader, Duration::from_secs(5), true, false);

    let mut report = DiagnosticReport::new();
    let result = engine
        .aggregate(&[descriptor("A", "/units/a.src")], &mut report)
        .await;

    assert_eq!(result.render(), PLAYLIST_HEADER);
    assert_eq!(report.count(Outcome::Warning), 1);
    assert_eq!(report.count(Outcome::Error), 0);
}

#[tokio::test]
async fn hung_source_is_cut_off_by_the_timeout() {
    let loader = Arc::new(ScriptedLoader::new(vec![
        ("slow", Behavior::Hang),
        (
            "fast",
            Behavior::Content("#EXTINF:-1,Chan2\nhttp://x/2".to_string()),
        ),
    ]));
    let engine = engine_with(loader, Duration::from_millis(100), true, false);

    let descriptors = vec![
        descriptor("Slow", "/units/slow.src"),
        descriptor("Fast", "/units/fast.src"),
    ];

    let mut report = DiagnosticReport::new();
    let result = engine.aggregate(&descriptors, &mut report).await;

    assert_eq!(
        result.render(),
        "#EXTM3U\n#EXTINF:-1,Chan2\nhttp://x/2"
    );
    assert_eq!(report.count(Outcome::Error), 1);
    let errors: Vec<_> = report
        .entries()
        .iter()
        .filter(|e| e.outcome == Outcome::Error)
        .collect();
    assert!(errors[0].message.contains("Slow"));
    assert!(errors[0].message.contains("timed out"));
}

#[tokio::test]
async fn exactly_one_marker_regardless_of_embedded_markers() {
    let loader = Arc::new(ScriptedLoader::new(vec![
        (
            "a",
            Behavior::Content("#EXTM3U\n#EXTINF:-1,Chan1\nhttp://x/1".to_string()),
        ),
        (
            "b",
            Behavior::Content("#EXTM3U\n\n#EXTINF:-1,Chan2\nhttp://x/2\n".to_string()),
        ),
    ]));
    let engine = engine_with(loader, Duration::from_secs(5), true, false);

    let descriptors = vec![
        descriptor("A", "/units/a.src"),
        descriptor("B", "/units/b.src"),
    ];

    let mut report = DiagnosticReport::new();
    let result = engine.aggregate(&descriptors, &mut report).await;

    let markers = result
        .lines()
        .iter()
        .filter(|l| l.contains(PLAYLIST_HEADER))
        .count();
    assert_eq!(markers, 1);
    assert_eq!(result.lines()[0], PLAYLIST_HEADER);
    // Config order preserved: A's channels before B's.
    assert_eq!(result.lines()[1], "#EXTINF:-1,Chan1");
    assert_eq!(result.lines()[3], "#EXTINF:-1,Chan2");
}

#[tokio::test]
async fn failure_markers_name_the_failed_source_when_enabled() {
    let loader = Arc::new(ScriptedLoader::new(vec![(
        "b",
        Behavior::FetchError("boom".to_string()),
    )]));
    let engine = engine_with(loader, Duration::from_secs(5), true, true);

    let mut report = DiagnosticReport::new();
    let result = engine
        .aggregate(&[descriptor("B", "/units/b.src")], &mut report)
        .await;

    assert_eq!(result.render(), "#EXTM3U\n# source B failed");
}

#[tokio::test]
async fn unchanged_unit_is_served_from_cache_when_reload_is_off() {
    let dir = tempfile::tempdir().unwrap();
    let unit_path = dir.path().join("cached.src");
    std::fs::write(&unit_path, b"unit v1").unwrap();

    let loader = Arc::new(ScriptedLoader::new(vec![(
        "cached",
        Behavior::Content("#EXTINF:-1,Chan1\nhttp://x/1".to_string()),
    )]));
    let engine = engine_with(Arc::clone(&loader), Duration::from_secs(5), false, false);

    let descriptors = vec![descriptor("A", unit_path.to_str().unwrap())];

    let mut report = DiagnosticReport::new();
    let first = engine.aggregate(&descriptors, &mut report).await;
    assert_eq!(loader.load_count(), 1);

    let second = engine.aggregate(&descriptors, &mut report).await;
    assert_eq!(loader.load_count(), 1, "second pass should hit the cache");
    assert_eq!(first.render(), second.render());

    // Editing the unit file invalidates the entry.
    std::fs::write(&unit_path, b"unit v2").unwrap();
    engine.aggregate(&descriptors, &mut report).await;
    assert_eq!(loader.load_count(), 2);
}

#[tokio::test]
async fn reload_every_request_loads_fresh_each_pass() {
    let dir = tempfile::tempdir().unwrap();
    let unit_path = dir.path().join("fresh.src");
    std::fs::write(&unit_path, b"unit").unwrap();

    let loader = Arc::new(ScriptedLoader::new(vec![(
        "fresh",
        Behavior::Content("#EXTINF:-1,Chan1\nhttp://x/1".to_string()),
    )]));
    let engine = engine_with(Arc::clone(&loader), Duration::from_secs(5), true, false);

    let descriptors = vec![descriptor("A", unit_path.to_str().unwrap())];
    let mut report = DiagnosticReport::new();
    engine.aggregate(&descriptors, &mut report).await;
    engine.aggregate(&descriptors, &mut report).await;
    assert_eq!(loader.load_count(), 2);
}
