//! HubSpot integration API
//!
//! Single-binary service that:
//! 1. Starts the HubSpot OAuth flow and returns the authorization URL
//! 2. Handles HubSpot's redirect and stages the token blob in the store
//! 3. Hands the blob to the caller exactly once
//! 4. Loads HubSpot contacts as integration items

mod config;
mod error;
mod form;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use hubspot_auth::HubspotOAuth;
use kv_store::{KvStore, MemoryStore, RedisStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreBackend, StoreConfig};
use crate::metrics::ServiceMetrics;
use crate::routes::{AppState, build_router, cors_layer};

/// Upper bound on in-flight request draining after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting hubspot-integration");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus = metrics::install_recorder().context("failed to install metrics recorder")?;

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);
    let config_path = Config::resolve_path(cli_config);

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    info!(
        path = %config_path.display(),
        listen_addr = %config.server.listen_addr,
        store = ?config.store.backend,
        "configuration loaded"
    );

    let store = connect_store(&config.store).await?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let oauth = HubspotOAuth::new(config.oauth_config()?, store.clone(), http_client.clone());

    let state = AppState {
        oauth,
        http_client,
        api_base_url: config.hubspot.api_base_url.clone(),
        store_backend: store.backend().to_owned(),
        metrics: ServiceMetrics::new(),
        prometheus,
    };

    let app = build_router(
        state,
        config.server.max_connections,
        cors_layer(&config.server.allowed_origins),
    );

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    info!(addr = %listen_addr, "accepting requests");

    // The drain timer starts when the shutdown signal fires, not at startup:
    // the server is told to drain, then raced against DRAIN_TIMEOUT.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => info!("all in-flight requests drained"),
        Ok(Ok(Err(e))) => error!(error = %e, "server error during shutdown"),
        Ok(Err(e)) => error!(error = %e, "server task panicked"),
        Err(_) => warn!(
            drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "drain timeout exceeded, forcing shutdown"
        ),
    }

    info!("shutdown complete");
    Ok(())
}

/// Open the configured store. Redis connects eagerly so a bad URL fails startup.
async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("using in-memory store; state is lost on restart and not shared across replicas");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("store.redis_url is required for the redis backend")?;
            let store = RedisStore::connect(url)
                .await
                .context("failed to connect to redis")?;
            Ok(Arc::new(store))
        }
    }
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
