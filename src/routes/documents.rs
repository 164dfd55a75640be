use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::document::{DocumentId, PDF_MEDIA_TYPE};
use crate::dto::document::{MessageResponse, UploadResponse};
use crate::errors::AppError;
use crate::services::pdf;
use crate::services::storage::StorageService;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/documents/upload",
    tag = "Documents",
    responses(
        (status = 201, body = UploadResponse),
        (status = 400, body = crate::errors::ErrorResponse),
        (status = 413, body = crate::errors::ErrorResponse),
    )
))]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let max_bytes = state.config.storage.max_upload_bytes;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;

        upload = Some((filename, content_type, data));
        break;
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("No file part".to_string()))?;

    if filename.is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }

    if data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(max_bytes));
    }

    if !pdf::is_acceptable_upload(&filename, content_type.as_deref(), &data) {
        tracing::info!(filename = %filename, content_type = ?content_type, "Rejected non-PDF upload");
        return Err(AppError::Validation(
            "Invalid file type. Only PDF allowed.".to_string(),
        ));
    }

    let blob_key = StorageService::generate_key();
    state.storage.upload(&blob_key, &data).await?;

    // The row is what makes a document visible, so it goes in last.
    let stored = match state
        .document_repo
        .create(&filename, &blob_key, data.len() as u64)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&blob_key).await {
                tracing::error!("Failed to remove orphaned blob {blob_key}: {cleanup:#}");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        document_id = %stored.document.id,
        filename = %stored.document.filename,
        filesize = stored.document.filesize,
        "Document uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            document: stored.document,
        }),
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/documents",
    tag = "Documents",
    responses((status = 200, body = Vec<crate::document::Document>))
))]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::document::Document>>, AppError> {
    let docs = state.document_repo.list().await?;
    Ok(Json(docs))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "Documents",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Raw PDF bytes", content_type = "application/pdf"),
        (status = 404, body = crate::errors::ErrorResponse),
    )
))]
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stored = state
        .document_repo
        .find_by_id(&DocumentId::new(id))
        .await?
        .ok_or_else(AppError::document_not_found)?;

    let data = state.storage.download(&stored.blob_key).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_filename(&stored.document.filename)
    );

    Ok((
        [
            (header::CONTENT_TYPE, PDF_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "Documents",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, body = crate::errors::ErrorResponse),
    )
))]
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = DocumentId::new(id);
    let stored = state
        .document_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(AppError::document_not_found)?;

    if !state.document_repo.delete(&id).await? {
        return Err(AppError::document_not_found());
    }

    // The document is gone once its row is; a stray blob only costs disk.
    if let Err(e) = state.storage.delete(&stored.blob_key).await {
        tracing::error!(document_id = %id, "Failed to delete blob: {e:#}");
    }

    tracing::info!(document_id = %id, "Document deleted");
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_bytes)
    } else {
        AppError::Validation(format!("Invalid multipart data: {e}"))
    }
}

/// Header-safe rendition of a stored filename.
fn attachment_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename() {
        assert_eq!(attachment_filename("report.pdf"), "report.pdf");
        assert_eq!(attachment_filename("my \"scan\".pdf"), "my _scan_.pdf");
        assert_eq!(attachment_filename("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(attachment_filename("a\r\nb.pdf"), "a__b.pdf");
    }
}
