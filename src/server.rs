//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, deletion worker lifecycle, and Axum server
//! lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::deletion_worker::DeletionPipeline;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::{
    FileUrlRepository, MemoryUrlRepository, PgUrlRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL with migrations, file, or memory)
/// - Deletion pipeline and its workers
/// - Axum HTTP server with graceful shutdown
///
/// After the server stops, the deletion workers are told to stop and joined.
/// Tasks still queued at that point are dropped.
///
/// # Errors
///
/// Returns an error if:
/// - Storage initialization fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let (pipeline, workers) =
        DeletionPipeline::start(repository.clone(), config.pipeline_settings(), stop_rx);

    let state = AppState::new(repository, pipeline, &config);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped, stopping deletion workers");
    let _ = stop_tx.send(true);
    workers.join().await;

    Ok(())
}

/// Builds the repository selected by the configuration.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail or the
/// storage file cannot be read.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    match config.storage_backend() {
        StorageBackend::Postgres(url) => {
            let repository =
                PgUrlRepository::connect(&url, config.db_max_connections, config.op_timeout())
                    .await
                    .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(repository.pool())
                .await
                .context("Failed to migrate")?;

            Ok(Arc::new(repository))
        }
        StorageBackend::File(path) => {
            let repository = FileUrlRepository::open(path.as_str())
                .await
                .with_context(|| format!("Failed to open storage file '{path}'"))?;
            Ok(Arc::new(repository))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage; records are lost on restart");
            Ok(Arc::new(MemoryUrlRepository::new()))
        }
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
