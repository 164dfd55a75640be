use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Blob storage on the local filesystem, one file per document.
#[derive(Clone)]
pub struct StorageService {
    base_path: PathBuf,
}

impl StorageService {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let base_path = PathBuf::from(&config.upload_dir);
        fs::create_dir_all(&base_path)
            .await
            .with_context(|| format!("Failed to create upload dir {}", base_path.display()))?;

        Ok(Self { base_path })
    }

    /// Writes to a temporary name first so a half-written blob is never
    /// visible under its final key.
    pub async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.base_path.join(key);
        let partial = self.base_path.join(format!("{key}.part"));

        fs::write(&partial, data)
            .await
            .context("Failed to write blob")?;
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(e).context("Failed to move blob into place");
        }

        Ok(())
    }

    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        fs::read(self.base_path.join(key))
            .await
            .with_context(|| format!("Failed to read blob {key}"))
    }

    /// Missing blobs are not an error; the metadata row is the source of truth.
    pub async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.base_path.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Blob {key} already gone");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob {key}")),
        }
    }

    /// Keys never contain the user-supplied filename.
    pub fn generate_key() -> String {
        format!("{}.pdf", Uuid::new_v4().simple())
    }
}
