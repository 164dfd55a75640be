use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;

use super::events::{MutationEvent, MutationEvents};
use super::store::DocumentStore;
use crate::document::{CreatedDocument, PDF_MEDIA_TYPE};

pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Failed to upload file. Please try again.";

/// A file picked on the patient's machine, with the media type its picker declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk and declares its media type from the extension,
    /// the same way a browser file input does.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Only PDF files are allowed.")]
    NotPdf { media_type: String },
}

/// The one validated file waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    file: LocalFile,
}

impl PendingUpload {
    pub fn file(&self) -> &LocalFile {
        &self.file
    }
}

/// What the form shows under the file input. Validation and submission
/// failures are kept apart so they can be rendered differently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Invalid(ValidationError),
    #[error("{}", UPLOAD_FAILED)]
    Failed,
}

/// How a file picker change was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The file is now the pending upload.
    Held,
    /// Nothing was picked; state is unchanged.
    Empty,
    /// An upload is in flight, so the picker is disabled and the file was
    /// neither validated nor kept.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub pending: Option<PendingUpload>,
    pub loading: bool,
    pub message: Option<String>,
    pub error: Option<UploadError>,
}

impl UploadState {
    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.pending.is_some() && !self.loading
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Uploaded(CreatedDocument),
    Failed,
    /// Another submission is still in flight; nothing was sent.
    Busy,
    NothingSelected,
}

pub struct UploadController<S: ?Sized> {
    store: Arc<S>,
    events: MutationEvents,
    state: watch::Sender<UploadState>,
}

impl<S: DocumentStore + ?Sized> UploadController<S> {
    pub fn new(store: Arc<S>, events: MutationEvents) -> Self {
        Self {
            store,
            events,
            state: watch::Sender::new(UploadState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Handles a file picker change. Non-PDF files are dropped on the spot;
    /// the store never hears about them.
    pub fn select(&self, file: Option<LocalFile>) -> Result<Selection, ValidationError> {
        let Some(file) = file else {
            return Ok(Selection::Empty);
        };

        if self.state.borrow().loading {
            tracing::debug!(filename = %file.name, "Ignoring selection while an upload is in flight");
            return Ok(Selection::Ignored);
        }

        if !file.is_pdf() {
            let error = ValidationError::NotPdf {
                media_type: file.media_type.clone(),
            };
            tracing::debug!(filename = %file.name, media_type = %file.media_type, "Rejected selection");
            self.state.send_modify(|s| {
                s.pending = None;
                s.message = None;
                s.error = Some(UploadError::Invalid(error.clone()));
            });
            return Err(error);
        }

        self.state.send_modify(|s| {
            s.pending = Some(PendingUpload { file });
            s.message = None;
            s.error = None;
        });
        Ok(Selection::Held)
    }

    pub fn reset(&self) {
        self.state.send_modify(|s| {
            s.pending = None;
            s.message = None;
            s.error = None;
        });
    }

    /// Sends the pending file. On failure the file stays selected so the
    /// patient can retry with one click.
    pub async fn submit(&self) -> SubmitOutcome {
        let mut outcome = SubmitOutcome::NothingSelected;
        let mut claimed = None;
        self.state.send_if_modified(|s| {
            if s.loading {
                outcome = SubmitOutcome::Busy;
                return false;
            }
            let Some(pending) = &s.pending else {
                return false;
            };
            claimed = Some(pending.file.clone());
            s.loading = true;
            s.message = None;
            s.error = None;
            true
        });

        let Some(file) = claimed else {
            return outcome;
        };

        match self.store.upload(&file).await {
            Ok(document) => {
                tracing::info!(document_id = %document.id, filename = %file.name, "Upload succeeded");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.pending = None;
                    s.message = Some(UPLOAD_SUCCEEDED.to_string());
                });
                self.events
                    .publish(MutationEvent::Uploaded(document.id.clone()));
                SubmitOutcome::Uploaded(document)
            }
            Err(e) => {
                tracing::error!(filename = %file.name, "Upload failed: {e}");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(UploadError::Failed);
                });
                SubmitOutcome::Failed
            }
        }
    }
}
