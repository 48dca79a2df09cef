//! Response DTOs for the web API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::file::{CatalogEntry, FileDescriptor};

/// Message returned with every successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process is serving.
    pub status: String,
    /// Current server time (RFC 3339).
    pub timestamp: String,
}

/// Upload response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Descriptor of the stored file.
    pub file: FileDescriptor,
    /// Retrieval URL (same as `file.url`).
    pub url: String,
}

impl UploadResponse {
    /// Wrap a descriptor in the upload response.
    pub fn new(file: FileDescriptor) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            url: file.url.clone(),
            file,
        }
    }
}

/// Catalog listing response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    /// Stored files.
    #[serde(default)]
    pub files: Vec<CatalogEntry>,
}
