//! Health check handler

use axum::Json;
use axum::response::IntoResponse;

use crate::web::responses::HealthResponse;

/// Fixed success response indicating the service is reachable
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}
