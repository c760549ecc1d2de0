//! Web layer
//!
//! Thin HTTP transport over the aggregation and diagnostic engines. Three
//! endpoints: a health check, the merged playlist, and the diagnostic
//! report. Handlers contain no pipeline logic; they read the sources file,
//! delegate, and shape the response.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::diagnostics::DiagnosticProbe;
use crate::pipeline::AggregationEngine;

pub mod handlers;
pub mod responses;

pub use responses::HealthResponse;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<AggregationEngine>,
    pub probe: Arc<DiagnosticProbe>,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", state.config.web.host, state.config.web.port)
            .parse()?;

        let app = Router::new()
            .route("/", get(handlers::health::health_check))
            .route("/health", get(handlers::health::health_check))
            .route("/iptv.m3u", get(handlers::playlist::get_playlist))
            .route("/diag", get(handlers::diagnostics::get_diagnostics))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state);

        Ok(Self { app, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind and serve until ctrl-c
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {e}");
    }
    tracing::info!("shutdown signal received");
}
