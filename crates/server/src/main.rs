use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vodpipe_core::{
    converter::{Converter, FfmpegConverter},
    fetcher::{HttpTransport, SegmentFetcher},
    load_config,
    resolver::UsherResolver,
    validate_config, JobEvent, JobOrchestrator, Pipeline,
};
use vodpipe_server::api::create_router;
use vodpipe_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("VODPIPE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Temporary download root: {:?}", config.downloader.temp_dir);

    // Segment transport and playlist resolver
    let transport = Arc::new(
        HttpTransport::new(config.downloader.request_timeout_secs)
            .context("Failed to create HTTP transport")?,
    );
    let resolver = Arc::new(
        UsherResolver::from_config(config.resolver.clone())
            .context("Failed to create playlist resolver")?,
    );
    let fetcher = SegmentFetcher::new(transport, config.downloader.fetcher_config());
    info!(
        "Segment fetcher ready ({} parallel downloads)",
        fetcher.config().max_parallel
    );

    // Converter
    let converter = Arc::new(FfmpegConverter::new(config.converter.clone()));
    if let Err(e) = converter.validate().await {
        warn!("{} (jobs with conversion enabled will fail)", e);
    }

    let pipeline = Pipeline::new(
        resolver,
        fetcher,
        converter,
        config.downloader.temp_dir.clone(),
    );

    // Orchestrator
    let orchestrator = Arc::new(JobOrchestrator::new(config.orchestrator.clone(), pipeline));
    spawn_event_logger(&orchestrator);
    orchestrator.start();
    info!("Job orchestrator started");

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&orchestrator)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if !orchestrator.can_shutdown().await {
        info!("Canceling queued and running jobs");
    }
    orchestrator.shutdown().await;

    Ok(())
}

/// Log every job list change.
fn spawn_event_logger(orchestrator: &JobOrchestrator) {
    let mut events = orchestrator.subscribe();

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(JobEvent::JobAdded { id }) => info!(job_id = %id, "Job added"),
                Ok(JobEvent::JobStateChanged { id, from, to }) => {
                    info!(job_id = %id, %from, %to, "Job state changed")
                }
                Ok(JobEvent::JobRemoved { id }) => info!(job_id = %id, "Job removed"),
                Ok(JobEvent::DownloadsCountChanged { count }) => {
                    info!(count, "Job list size changed")
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event logger fell behind, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
