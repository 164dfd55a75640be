use std::sync::Arc;

use chrono::{Local, Locale};
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use url::Url;

use super::download::download_url;
use super::events::MutationEvent;
use super::store::DocumentStore;
use crate::document::{Document, DocumentId};
use crate::format::{format_size, format_timestamp};

pub const LIST_FAILED: &str = "Failed to load documents.";

/// Client-side copy of the document list.
///
/// Every fetch bumps `generation`; a response is applied only while its
/// generation is still the newest one, so slow stale replies are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub documents: Vec<Document>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl Default for ListState {
    /// Starts out loading: the first fetch is issued on mount.
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            loading: true,
            error: None,
            generation: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Loading,
    Success,
    Failure,
}

impl ListState {
    pub fn phase(&self) -> ListPhase {
        if self.loading {
            ListPhase::Loading
        } else if self.error.is_some() {
            ListPhase::Failure
        } else {
            ListPhase::Success
        }
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.iter().any(|d| &d.id == id)
    }
}

/// One table row, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub id: DocumentId,
    pub filename: String,
    pub size: String,
    pub uploaded_at: String,
    pub download_url: Url,
}

impl DocumentRow {
    pub fn new(document: &Document, base_url: &Url, locale: Locale) -> Self {
        Self {
            id: document.id.clone(),
            filename: document.filename.clone(),
            size: format_size(document.filesize),
            uploaded_at: format_timestamp(&document.created_at.with_timezone(&Local), locale),
            download_url: download_url(base_url, &document.id),
        }
    }
}

/// What the list area renders. A failed fetch replaces the whole table.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Failed(String),
    Empty,
    Documents(Vec<DocumentRow>),
}

pub struct ListingController<S: ?Sized> {
    store: Arc<S>,
    state: watch::Sender<ListState>,
    base_url: Url,
    locale: Locale,
}

impl<S: DocumentStore + ?Sized> ListingController<S> {
    pub fn new(store: Arc<S>, base_url: Url) -> Self {
        Self {
            store,
            state: watch::Sender::new(ListState::default()),
            base_url,
            locale: Locale::en_US,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Re-fetches the full list. Returns whether this fetch's result was
    /// applied (`false` when a newer refresh superseded it).
    pub async fn refresh(&self) -> bool {
        let generation = self.begin();
        let result = self.store.list().await;

        self.state.send_if_modified(|s| {
            if s.generation != generation {
                tracing::debug!(generation, latest = s.generation, "Discarding stale document list");
                return false;
            }

            match result {
                Ok(documents) => {
                    tracing::debug!(count = documents.len(), "Document list refreshed");
                    s.documents = documents;
                    s.error = None;
                }
                Err(e) => {
                    tracing::error!("Failed to load documents: {e}");
                    s.error = Some(LIST_FAILED.to_string());
                }
            }
            s.loading = false;
            true
        })
    }

    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            s.loading = true;
            generation = s.generation;
        });
        generation
    }

    /// Fetches once for the mount, then once per mutation event until the
    /// bus is closed.
    pub async fn follow(&self, mut events: BroadcastStream<MutationEvent>) {
        self.refresh().await;

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => tracing::debug!(?event, "Refreshing after mutation"),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed mutation events, refreshing once")
                }
            }
            self.refresh().await;
        }
    }

    pub fn view(&self) -> ListView {
        let state = self.state.borrow();

        if state.loading && state.documents.is_empty() {
            return ListView::Loading;
        }
        if let Some(error) = &state.error {
            return ListView::Failed(error.clone());
        }
        if state.documents.is_empty() {
            return ListView::Empty;
        }

        ListView::Documents(
            state
                .documents
                .iter()
                .map(|d| DocumentRow::new(d, &self.base_url, self.locale))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ClientError;
    use crate::client::events::MutationEvents;
    use crate::client::testing::MemoryStore;
    use crate::client::upload::LocalFile;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn base_url() -> Url {
        Url::parse("http://localhost:5000").unwrap()
    }

    fn listing(store: &Arc<MemoryStore>) -> ListingController<MemoryStore> {
        ListingController::new(store.clone(), base_url())
    }

    #[test]
    fn test_starts_loading() {
        let store = Arc::new(MemoryStore::default());
        let listing = listing(&store);
        assert_eq!(listing.snapshot().phase(), ListPhase::Loading);
        assert_eq!(listing.view(), ListView::Loading);
        assert_eq!(store.list_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let store = Arc::new(MemoryStore::with_documents(&["a.pdf", "b.pdf"]));
        let listing = listing(&store);

        assert!(listing.refresh().await);

        let state = listing.snapshot();
        assert_eq!(state.phase(), ListPhase::Success);
        let names: Vec<_> = state.documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);

        let ListView::Documents(rows) = listing.view() else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].size, "1 KB");
        assert_eq!(
            rows[0].download_url.as_str(),
            format!("http://localhost:5000/documents/{}", rows[0].id)
        );
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let store = Arc::new(MemoryStore::with_documents(&["a.pdf", "b.pdf"]));
        let listing = listing(&store);

        listing.refresh().await;
        let first = listing.view();
        listing.refresh().await;
        let second = listing.view();

        assert_eq!(first, second);
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_list() {
        let store = Arc::new(MemoryStore::default());
        let listing = listing(&store);
        listing.refresh().await;
        assert_eq!(listing.view(), ListView::Empty);
    }

    #[tokio::test]
    async fn test_first_load_failure_shows_error() {
        let store = Arc::new(MemoryStore::default());
        store.fail_lists(true);
        let listing = listing(&store);

        listing.refresh().await;

        let state = listing.snapshot();
        assert_eq!(state.phase(), ListPhase::Failure);
        assert!(state.documents.is_empty());
        assert_eq!(listing.view(), ListView::Failed(LIST_FAILED.to_string()));
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_list_and_retry_recovers() {
        let store = Arc::new(MemoryStore::with_documents(&["a.pdf"]));
        let listing = listing(&store);
        listing.refresh().await;

        store.fail_lists(true);
        listing.refresh().await;
        let state = listing.snapshot();
        assert_eq!(state.error.as_deref(), Some(LIST_FAILED));
        assert_eq!(state.documents.len(), 1);
        assert!(!state.loading);

        store.fail_lists(false);
        listing.refresh().await;
        let state = listing.snapshot();
        assert_eq!(state.phase(), ListPhase::Success);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_follow_refreshes_once_per_event() {
        let store = Arc::new(MemoryStore::default());
        let listing = listing(&store);
        let events = MutationEvents::new();
        let stream = events.subscribe();

        events.publish(MutationEvent::Uploaded(DocumentId::new("1")));
        events.publish(MutationEvent::Deleted(DocumentId::new("1")));
        drop(events);

        listing.follow(stream).await;
        // One for mount, one per event.
        assert_eq!(store.list_calls(), 3);
    }

    /// Store whose list replies are released by the test, in any order.
    struct ScriptedStore {
        replies: Mutex<VecDeque<oneshot::Receiver<Vec<Document>>>>,
    }

    #[async_trait]
    impl DocumentStore for ScriptedStore {
        async fn upload(
            &self,
            _file: &LocalFile,
        ) -> Result<crate::document::CreatedDocument, ClientError> {
            unimplemented!()
        }

        async fn list(&self) -> Result<Vec<Document>, ClientError> {
            let reply = self.replies.lock().unwrap().pop_front().unwrap();
            Ok(reply.await.unwrap())
        }

        async fn delete(&self, _id: &DocumentId) -> Result<(), ClientError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let source = MemoryStore::default();
        let old = source.insert("old.pdf", 1);
        let new = source.insert("new.pdf", 2);

        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let store = Arc::new(ScriptedStore {
            replies: Mutex::new(VecDeque::from([first_rx, second_rx])),
        });
        let listing = ListingController::new(store, base_url());

        let (first_applied, second_applied, ()) = tokio::join!(
            listing.refresh(),
            listing.refresh(),
            async {
                second_tx.send(vec![new.clone()]).unwrap();
                tokio::task::yield_now().await;
                first_tx.send(vec![old.clone()]).unwrap();
            }
        );

        assert!(!first_applied);
        assert!(second_applied);
        let state = listing.snapshot();
        assert_eq!(state.documents, vec![new]);
        assert!(!state.loading);
    }
}
