//! Diagnostics endpoint handler

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::diagnostics::DiagnosticReport;
use crate::models::SourcesConfig;
use crate::web::AppState;

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Serve the diagnostic report
///
/// Always returns 200: failed checks are report content, not transport
/// errors. Even an unreadable sources file becomes an error-tagged entry.
pub async fn get_diagnostics(State(state): State<AppState>) -> Response {
    let report = match SourcesConfig::load_from_file(&state.config.sources.file).await {
        Ok(sources) => state.probe.run(&sources.lives).await,
        Err(e) => {
            let mut report = DiagnosticReport::new();
            report.error(format!("cannot read sources file: {e}"));
            report
        }
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
        report.render(),
    )
        .into_response()
}
