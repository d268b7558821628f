//! Event registration HTTP server.
//!
//! Connects to `PostgreSQL`, applies migrations, and serves the JSON API.

mod config;

use config::Config;
use metrics_exporter_prometheus::PrometheusBuilder;
use registrar_core::SystemClock;
use registrar_postgres::PostgresRepository;
use registrar_web::{AppState, build_router, metrics::register_metrics};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,registrar_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting registration server");

    let config = Config::from_env()?;
    let addr = config.server.address()?;
    let metrics_addr = config.server.metrics_address()?;

    // Prometheus exporter on its own listener
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()?;
    register_metrics();
    info!(address = %metrics_addr, "Metrics exporter listening");

    info!("Connecting to database...");
    let pool = config.postgres.connect().await?;
    let repository = PostgresRepository::new(pool);
    repository.migrate().await?;
    info!("Database ready");

    let state = AppState::from_repository(repository, Arc::new(SystemClock));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
