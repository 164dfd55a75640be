use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use super::deletion::DeletionController;
use super::error::ClientError;
use super::events::MutationEvents;
use super::listing::ListingController;
use super::store::{DocumentStore, HttpDocumentStore};
use super::upload::UploadController;
use crate::config::ClientConfig;

/// The document page: one store, one event bus and the controllers wired to it.
pub struct Portal<S: ?Sized> {
    pub events: MutationEvents,
    pub upload: UploadController<S>,
    pub listing: Arc<ListingController<S>>,
    pub deletion: DeletionController<S>,
}

impl Portal<HttpDocumentStore> {
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let store = HttpDocumentStore::new(config)?;
        let base_url = store.base_url().clone();
        Ok(Self::new(Arc::new(store), base_url))
    }
}

impl<S: DocumentStore + ?Sized + 'static> Portal<S> {
    pub fn new(store: Arc<S>, base_url: Url) -> Self {
        let events = MutationEvents::new();
        Self {
            upload: UploadController::new(store.clone(), events.clone()),
            listing: Arc::new(ListingController::new(store.clone(), base_url)),
            deletion: DeletionController::new(store, events.clone()),
            events,
        }
    }

    /// Loads the list and keeps it in step with uploads and deletions.
    ///
    /// The follower stops once the portal (and every clone of its event bus)
    /// is dropped, or when the handle is aborted.
    pub fn mount(&self) -> JoinHandle<()> {
        let listing = self.listing.clone();
        let events = self.events.subscribe();
        tokio::spawn(async move { listing.follow(events).await })
    }
}
