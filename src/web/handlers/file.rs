//! File handlers for the web API.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::VaultError;
use crate::web::dto::{FileListResponse, UploadForm, UploadResponse};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;
use crate::web::middleware::RequestLinks;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError, what: &str) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("File too large");
    }
    tracing::warn!("Failed to {}: {}", what, e);
    ApiError::bad_request("Invalid multipart data")
}

/// POST /api/upload - Upload one file.
///
/// Request body: multipart/form-data with a `file` field. Only the first
/// `file` field carrying a file name is stored; other fields are ignored.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file uploaded", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    RequestLinks(links): RequestLinks,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "read multipart field"))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let mut pending = state
            .vault
            .begin_upload()
            .await
            .map_err(|e| state.api_error(e))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, "read file content"))?
        {
            if pending.bytes_written() + chunk.len() as u64 > state.max_upload_size {
                let max_mb = state.max_upload_size / 1024 / 1024;
                return Err(ApiError::payload_too_large(format!(
                    "File too large (max {}MB)",
                    max_mb
                )));
            }
            pending
                .write_chunk(&chunk)
                .await
                .map_err(|e| state.api_error(e))?;
        }

        let descriptor = state
            .vault
            .complete_upload(pending, &original_name, &links)
            .await
            .map_err(|e| state.api_error(e))?;

        return Ok(Json(UploadResponse::new(descriptor)));
    }

    Err(state.api_error(VaultError::MissingFile))
}

/// GET /api/files - List stored files.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Current catalog", body = FileListResponse),
        (status = 500, description = "Storage root unreadable", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    RequestLinks(links): RequestLinks,
) -> Result<Json<FileListResponse>, ApiError> {
    let files = state
        .vault
        .catalog(&links)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(FileListResponse { files }))
}

/// GET /uploads/:name - Serve a stored file verbatim.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored name")
    ),
    responses(
        (status = 200, description = "Raw file content"),
        (status = 404, description = "File not found", body = ErrorBody)
    )
)]
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let file = state
        .vault
        .open(&name)
        .await
        .map_err(|e| state.api_error(e))?;

    let content_type = file.content_type();
    let content_length = file.content.len();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .body(Body::from(file.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// Fallback for unmatched routes.
pub async fn unhandled_route() -> ApiError {
    ApiError::unhandled_route()
}
