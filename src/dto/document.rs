use serde::{Deserialize, Serialize};

use crate::document::{CreatedDocument, Document};

/// Body of a successful `POST /documents/upload`.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    pub document: Document,
}

/// The part of an upload response the client relies on.
#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub document: CreatedDocument,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
