//! OpenAPI description of the web API.

use axum::Json;
use utoipa::OpenApi;

use crate::file::{CatalogEntry, FileDescriptor};
use crate::web::dto::{FileListResponse, HealthResponse, UploadForm, UploadResponse};
use crate::web::error::{ErrorBody, ErrorCode, ErrorDetail};
use crate::web::handlers;

/// API documentation root.
#[derive(OpenApi)]
#[openapi(
    info(title = "Cloud Vault API"),
    paths(
        handlers::file::upload_file,
        handlers::file::list_files,
        handlers::file::serve_upload,
        handlers::health::health_check,
    ),
    components(schemas(
        FileDescriptor,
        CatalogEntry,
        UploadForm,
        UploadResponse,
        FileListResponse,
        HealthResponse,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "files", description = "Upload, list and fetch stored files"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json - The OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
