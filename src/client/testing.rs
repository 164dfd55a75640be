//! In-memory store double for controller tests.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use super::error::ClientError;
use super::store::DocumentStore;
use super::upload::LocalFile;
use crate::document::{CreatedDocument, Document, DocumentId};

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<Document>>,
    next_id: AtomicI64,
    upload_calls: AtomicUsize,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_lists: AtomicBool,
    fail_deletes: AtomicBool,
    upload_gate: Mutex<Option<Arc<Notify>>>,
}

pub fn pdf_file(name: &str) -> LocalFile {
    LocalFile::new(name, "application/pdf", b"%PDF-1.4\n%test".to_vec())
}

fn offline() -> ClientError {
    ClientError::Status {
        status: 503,
        message: "store offline".to_string(),
    }
}

impl MemoryStore {
    pub fn with_documents(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store.insert(name, 1024);
        }
        store
    }

    pub fn insert(&self, filename: &str, filesize: u64) -> Document {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let document = Document {
            id: DocumentId::from(id),
            filename: filename.to_string(),
            filesize,
            created_at: Utc::now(),
        };
        self.documents.lock().unwrap().insert(0, document.clone());
        document
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Makes the next uploads wait until the returned handle is notified.
    pub fn hold_uploads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.upload_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upload(&self, file: &LocalFile) -> Result<CreatedDocument, ClientError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.upload_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(offline());
        }
        Ok(self.insert(&file.name, file.bytes.len() as u64).into())
    }

    async fn list(&self) -> Result<Vec<Document>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(offline());
        }
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn delete(&self, id: &DocumentId) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(offline());
        }
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| &d.id != id);
        if documents.len() == before {
            return Err(ClientError::NotFound("Document not found".to_string()));
        }
        Ok(())
    }
}
