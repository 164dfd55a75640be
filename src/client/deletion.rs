use std::sync::Arc;

use super::events::{MutationEvent, MutationEvents};
use super::store::DocumentStore;
use crate::document::DocumentId;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this document?";
pub const DELETE_FAILED: &str = "Failed to delete document.";

/// Asks the patient to confirm an irreversible action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The patient declined; nothing was sent.
    Cancelled,
    Deleted,
    /// Alert text for the patient. The list is left as it was.
    Failed(String),
}

pub struct DeletionController<S: ?Sized> {
    store: Arc<S>,
    events: MutationEvents,
}

impl<S: DocumentStore + ?Sized> DeletionController<S> {
    pub fn new(store: Arc<S>, events: MutationEvents) -> Self {
        Self { store, events }
    }

    /// Deletes after confirmation. No optimistic removal and no retry: the
    /// row disappears only through the refresh the published event triggers.
    pub async fn delete(&self, id: &DocumentId, confirm: &impl Confirm) -> DeleteOutcome {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(document_id = %id, "Deletion cancelled");
            return DeleteOutcome::Cancelled;
        }

        match self.store.delete(id).await {
            Ok(()) => {
                tracing::info!(document_id = %id, "Document deleted");
                self.events.publish(MutationEvent::Deleted(id.clone()));
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::error!(document_id = %id, "Failed to delete document: {e}");
                DeleteOutcome::Failed(DELETE_FAILED.to_string())
            }
        }
    }
}
