use axum::Router;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::document::{Document, DocumentId};
use crate::dto::document::{MessageResponse, UploadResponse};
use crate::errors::ErrorResponse;
use crate::routes::health::HealthResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Patient Document Store API",
        version = "0.1.0",
        description = "Upload, list, download and delete a patient's PDF documents."
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::documents::upload,
        crate::routes::documents::list,
        crate::routes::documents::download,
        crate::routes::documents::delete_document,
    ),
    components(schemas(
        Document,
        DocumentId,
        UploadResponse,
        MessageResponse,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Documents", description = "Document upload and management"),
    )
)]
pub struct ApiDoc;

pub fn redoc_routes() -> Router<AppState> {
    Router::new().merge(Redoc::with_url("/docs", ApiDoc::openapi()))
}
