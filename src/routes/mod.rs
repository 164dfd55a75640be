pub mod documents;
pub mod health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

// Room for the multipart boundaries and part headers around the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.storage.max_upload_bytes + MULTIPART_OVERHEAD;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let document_routes = Router::new()
        .route("/documents", get(documents::list))
        .route(
            "/documents/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/documents/{id}",
            get(documents::download).delete(documents::delete_document),
        );

    let app = Router::new()
        .route("/health", get(health::health_check))
        .merge(document_routes);

    #[cfg(feature = "openapi")]
    let app = app.merge(crate::openapi::redoc_routes());

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
