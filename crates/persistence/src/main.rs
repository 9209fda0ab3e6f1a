//! Pandamonium persistence API server
//!
//! Handles:
//! - Configuration and logging set-up
//! - Prometheus exporter
//! - Record store selection (PostgreSQL or in-memory)
//! - Serving the route table until shutdown

use std::net::SocketAddr;

use anyhow::Context;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use pandamonium_common::{
    config::{AppConfig, ObservabilityConfig},
    db::Stores,
    metrics::{self, LATENCY_BUCKETS},
};
use pandamonium_persistence::{create_router, AppState};
use tokio::{signal, sync::oneshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting Pandamonium persistence API v{}",
        pandamonium_common::VERSION
    );

    init_metrics(&config.observability)?;

    let stores = Stores::open(&config.database).await?;
    let app = create_router(AppState::new(stores));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                stop_rx.await.ok();
            })
            .await
    });

    shutdown_signal().await;
    stop_tx.send(()).ok();

    // In-flight requests get a bounded drain window
    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(joined) => joined??,
        Err(_) => warn!(
            "Graceful shutdown did not finish within {}s",
            config.server.shutdown_timeout_secs
        ),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn init_metrics(config: &ObservabilityConfig) -> anyhow::Result<()> {
    metrics::register_metrics();

    if config.metrics_port == 0 {
        info!("Prometheus exporter disabled");
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Suffix("duration_seconds".to_string()), LATENCY_BUCKETS)?
        .with_http_listener(addr)
        .install()
        .context("failed to install Prometheus exporter")?;

    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
