//! The web client side of the portal: talks to a document store and keeps
//! the page state (pending upload, document list) consistent with it.

pub mod deletion;
pub mod download;
pub mod error;
pub mod events;
pub mod listing;
pub mod portal;
pub mod store;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use deletion::{Confirm, DeleteOutcome, DeletionController};
pub use download::download_url;
pub use error::ClientError;
pub use events::{MutationEvent, MutationEvents};
pub use listing::{DocumentRow, ListPhase, ListState, ListView, ListingController};
pub use portal::Portal;
pub use store::{DocumentStore, HttpDocumentStore};
pub use upload::{
    LocalFile, PendingUpload, Selection, SubmitOutcome, UploadController, UploadError,
    UploadState, ValidationError,
};
