//! Playlist endpoint handler

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::diagnostics::{DiagnosticReport, Outcome};
use crate::models::SourcesConfig;
use crate::web::AppState;

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Serve the merged playlist document
///
/// A missing or malformed sources file is the only fatal condition; every
/// per-source failure has already been contained by the engine, so the
/// response is always a valid document beginning with the directive marker.
pub async fn get_playlist(State(state): State<AppState>) -> Response {
    let sources = match SourcesConfig::load_from_file(&state.config.sources.file).await {
        Ok(sources) => sources,
        Err(e) => {
            tracing::error!(error = %e, "cannot start aggregation pass");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
                e.to_string(),
            )
                .into_response();
        }
    };

    let mut report = DiagnosticReport::new();
    let result = state.engine.aggregate(&sources.lives, &mut report).await;
    tracing::info!(
        sources = sources.lives.len(),
        lines = result.channel_line_count(),
        warnings = report.count(Outcome::Warning),
        errors = report.count(Outcome::Error),
        "aggregation pass finished"
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
        result.render(),
    )
        .into_response()
}
