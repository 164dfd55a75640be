use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::document::DocumentId;

const CHANNEL_CAPACITY: usize = 64;

/// Published after the store confirmed a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    Uploaded(DocumentId),
    Deleted(DocumentId),
}

/// Bus connecting the upload and deletion controllers to the listing.
#[derive(Debug, Clone)]
pub struct MutationEvents {
    sender: broadcast::Sender<MutationEvent>,
}

impl MutationEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: MutationEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::debug!(event = ?e.0, "No subscribers for mutation event");
        }
    }

    /// Only events published after this call are delivered.
    pub fn subscribe(&self) -> BroadcastStream<MutationEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }
}

impl Default for MutationEvents {
    fn default() -> Self {
        Self::new()
    }
}
