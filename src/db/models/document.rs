use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::document::{Document, DocumentId};

/// A document row together with the storage key of its blob.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document: Document,
    pub blob_key: String,
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        filename: &str,
        blob_key: &str,
        filesize: u64,
    ) -> Result<StoredDocument> {
        let now = Utc::now();
        let size = i64::try_from(filesize).context("File size out of range")?;

        let result = sqlx::query(
            "INSERT INTO documents (filename, blob_key, filesize, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(filename)
        .bind(blob_key)
        .bind(size)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert document")?;

        Ok(StoredDocument {
            document: Document {
                id: DocumentId::from(result.last_insert_rowid()),
                filename: filename.to_string(),
                filesize,
                created_at: now,
            },
            blob_key: blob_key.to_string(),
        })
    }

    /// Ids the store never issued (including non-numeric ones) resolve to `None`.
    pub async fn find_by_id(&self, id: &DocumentId) -> Result<Option<StoredDocument>> {
        let Ok(row_id) = id.as_str().parse::<i64>() else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT id, filename, blob_key, filesize, created_at
             FROM documents WHERE id = ?",
        )
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query document")?;

        row.map(|r| Self::map_row(&r)).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(
            "SELECT id, filename, blob_key, filesize, created_at
             FROM documents ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list documents")?;

        rows.iter()
            .map(|r| Self::map_row(r).map(|stored| stored.document))
            .collect()
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: &DocumentId) -> Result<bool> {
        let Ok(row_id) = id.as_str().parse::<i64>() else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(row_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete document")?;

        Ok(result.rows_affected() > 0)
    }

    fn map_row(row: &SqliteRow) -> Result<StoredDocument> {
        let id: i64 = row.try_get("id").context("Failed to get id")?;
        let filesize: i64 = row.try_get("filesize").context("Failed to get filesize")?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .context("Failed to get created_at")?;

        Ok(StoredDocument {
            document: Document {
                id: DocumentId::from(id),
                filename: row.try_get("filename").context("Failed to get filename")?,
                filesize: u64::try_from(filesize).context("Negative filesize in row")?,
                created_at,
            },
            blob_key: row.try_get("blob_key").context("Failed to get blob_key")?,
        })
    }
}
