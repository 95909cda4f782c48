use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use divelog_api::config::AppConfig;
use divelog_api::database::{schema, DatabaseManager, PgStore};
use divelog_api::storage::SupabaseStorage;
use divelog_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("divelog_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting divelog API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.reset_on_start {
        schema::reset_schema(&pool).await.context("failed to reset schema")?;
    } else {
        schema::ensure_schema(&pool).await.context("failed to create schema")?;
    }

    let storage = SupabaseStorage::from_config(&config.storage)
        .context("failed to configure object storage")?;

    let port = config.server.port;
    let state = AppState::new(config, Arc::new(PgStore::new(pool)), Arc::new(storage));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
