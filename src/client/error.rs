/// Failure of a call against the document store.
///
/// Controllers log these and show a per-operation message instead of passing
/// them on to the renderer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request to document store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Document store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document store URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}
