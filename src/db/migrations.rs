use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub async fn run_all(pool: &SqlitePool) -> Result<()> {
    create_documents_table(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

// AUTOINCREMENT keeps SQLite from handing out the id of a deleted row again.
async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            blob_key TEXT NOT NULL UNIQUE,
            filesize INTEGER NOT NULL CHECK(filesize >= 0),
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at);",
    )
    .execute(pool)
    .await
    .context("Failed to create documents table")?;
    Ok(())
}
