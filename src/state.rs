use crate::config::AppConfig;
use crate::db::models::document::DocumentRepository;
use crate::services::storage::StorageService;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub document_repo: DocumentRepository,
    pub storage: StorageService,
}

impl AppState {
    pub fn new(config: AppConfig, db: SqlitePool, storage: StorageService) -> Self {
        Self {
            config: Arc::new(config),
            document_repo: DocumentRepository::new(db),
            storage,
        }
    }
}
