//! Shared setup for the store and end-to-end tests.
#![allow(dead_code)]

use patient_docs::config::{
    AppConfig, ClientConfig, DatabaseConfig, ServerConfig, StorageConfig,
};
use patient_docs::db::{connection, migrations};
use patient_docs::routes::build_router;
use patient_docs::services::storage::StorageService;
use patient_docs::state::AppState;
use tempfile::TempDir;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";
pub const BOUNDARY: &str = "patient-docs-test-boundary";

/// Store state backed by an in-memory database and a temporary blob dir.
/// Keep the returned dir alive for as long as the state is used.
pub async fn test_state(max_upload_bytes: usize) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        storage: StorageConfig {
            upload_dir: dir.path().join("uploads").display().to_string(),
            max_upload_bytes,
        },
        client: ClientConfig {
            base_url: "http://127.0.0.1".to_string(),
            request_timeout_secs: 10,
            bearer_token: None,
        },
    };

    let pool = connection::create_pool(&config.database)
        .await
        .expect("Failed to create pool");
    migrations::run_all(&pool).await.expect("Failed to migrate");
    let storage = StorageService::new(&config.storage)
        .await
        .expect("Failed to create storage");

    (AppState::new(config, pool, storage), dir)
}

/// Serves a fresh store on an ephemeral port and returns its base URL.
pub async fn spawn_store() -> (String, TempDir) {
    let (state, dir) = test_state(1024 * 1024).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("Store server failed");
    });

    (format!("http://{addr}"), dir)
}

pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 10,
        bearer_token: None,
    }
}

/// A multipart body with a single file part.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
