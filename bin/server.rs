// Account Service - Web Server

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use account_service::{api, logging, AccountService, AppConfig, SqliteStore};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init_logging(&config.log_filter)?;

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let service = Arc::new(AccountService::new(store));

    let app = api::router(service);

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;

    info!(addr = %config.server_addr, "account server listening");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
