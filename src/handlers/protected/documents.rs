// handlers/protected/documents.rs - /api/portal/applications/:id/documents handlers
//
// Blob bytes go through the configured `BlobStore`, metadata through the row
// store. Uploads are multipart with the file in a field named `file`.

use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::PathRejection;
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::path_params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::portal::attachments::{self, DocumentUpload};
use crate::portal::models::ApplicationDocument;
use crate::portal::Session;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

/// GET /api/portal/applications/:id/documents - newest first
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<ApplicationDocument>> {
    let application_id = path_params(path)?;
    let documents = attachments::list_documents(state.store.as_ref(), application_id).await?;
    Ok(ApiResponse::success(documents))
}

/// POST /api/portal/applications/:id/documents - multipart upload
pub async fn upload(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<Uuid>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ApplicationDocument> {
    let application_id = path_params(path)?;
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("file").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some(DocumentUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| ApiError::bad_request("Multipart field 'file' is required"))?;

    let document = attachments::upload_document(
        state.store.as_ref(),
        state.blobs.as_ref(),
        &session,
        application_id,
        upload,
        state.config.storage.max_upload_bytes,
    )
    .await?;
    Ok(ApiResponse::created(document))
}

/// GET /api/portal/applications/:id/documents/:doc_id - raw file download
pub async fn download(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Response, ApiError> {
    let (application_id, document_id) = path_params(path)?;
    let (document, bytes) =
        attachments::download_document(state.store.as_ref(), state.blobs.as_ref(), application_id, document_id).await?;

    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    // File names are sanitized on upload, so they are always valid header text.
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", document.file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
        Body::from(bytes),
    )
        .into_response())
}

/// DELETE /api/portal/applications/:id/documents/:doc_id - remove blob and metadata
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<()> {
    let (application_id, document_id) = path_params(path)?;
    attachments::delete_document(state.store.as_ref(), state.blobs.as_ref(), application_id, document_id).await?;
    info!("Broker {} deleted document {} from application {}", session.user_id, document_id, application_id);
    Ok(ApiResponse::<()>::no_content())
}
