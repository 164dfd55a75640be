use anyhow::Context;
use tracing_subscriber::EnvFilter;

use patient_docs::config::AppConfig;
use patient_docs::db::{connection, migrations};
use patient_docs::routes::build_router;
use patient_docs::services::storage::StorageService;
use patient_docs::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded (env: {})", std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into()));

    if let Some(dir) = sqlite_parent_dir(&config.database.url) {
        tokio::fs::create_dir_all(dir)
            .await
            .context("Failed to create database directory")?;
    }

    let db_pool = connection::create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    migrations::run_all(&db_pool)
        .await
        .context("Failed to run migrations")?;

    let storage = StorageService::new(&config.storage)
        .await
        .context("Failed to initialise blob storage")?;

    let state = AppState::new(config.clone(), db_pool, storage);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting document store on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

fn sqlite_parent_dir(url: &str) -> Option<&std::path::Path> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    if path.starts_with(":memory:") {
        return None;
    }
    std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
}
