use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_aggregator::{
    config::Config,
    diagnostics::DiagnosticProbe,
    pipeline::{AggregationEngine, ContentCache},
    sources::{ExecutionIsolator, ProcessUnitLoader, loader::UnitLoader},
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "m3u-aggregator")]
#[command(version)]
#[command(about = "Live playlist aggregation service with isolated source-unit execution")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("m3u_aggregator={},tower_http=trace", cli.log_level)
    } else {
        format!("m3u_aggregator={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting M3U Aggregator Service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let source_timeout = config.source_timeout()?;
    match source_timeout {
        Some(timeout) => info!("Per-source execution timeout: {:?}", timeout),
        None => info!("Per-source execution timeout disabled"),
    }
    info!(
        "Sources file: {} (reload_every_request={})",
        config.sources.file.display(),
        config.sources.reload_every_request
    );

    let loader: Arc<dyn UnitLoader> = Arc::new(ProcessUnitLoader::new());
    let isolator = ExecutionIsolator::new(source_timeout);
    let cache = Arc::new(ContentCache::new());

    let engine = Arc::new(AggregationEngine::new(
        Arc::clone(&loader),
        isolator.clone(),
        cache,
        config.sources.reload_every_request,
        config.sources.include_failure_markers,
    ));

    let probe_client = reqwest::Client::builder()
        .timeout(config.probe_timeout()?)
        .build()?;
    let probe = Arc::new(DiagnosticProbe::new(
        probe_client,
        config.diagnostics.ip_echo_url.clone(),
        loader,
        isolator,
    ));

    let state = AppState {
        config: Arc::new(config),
        engine,
        probe,
    };

    let server = WebServer::new(state)?;
    info!("Starting web server on {}", server.addr());
    server.serve().await
}
