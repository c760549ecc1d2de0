//! HTTP response types
//!
//! Standardized payload shapes shared by the handlers.

use serde::Serialize;

/// Health check payload
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthResponse {
    /// The fixed success response: reachable means healthy
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: chrono::Utc::now(),
        }
    }
}
