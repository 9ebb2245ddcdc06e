use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use storage_gateway::{config::Config, create_router, storage::S3Client, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing storage settings stop the process here
    let config = Config::from_env().context("Failed to load configuration")?;

    shared::observability::init_logging(config.logging.to_log_config("storage-gateway"))?;
    info!("Starting Storage Gateway...");
    info!(endpoint = %config.storage.endpoint, "Configuration loaded");

    let s3_client = S3Client::new(&config.storage).context("Failed to initialize S3 client")?;
    info!("S3 client initialized successfully");

    let app = create_router(AppState::new(Arc::new(s3_client)));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Storage Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Storage Gateway stopped");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving; without a signal handler there is nothing to wait for
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
