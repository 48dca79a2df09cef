//! API handlers for the web surface.

pub mod file;
pub mod health;

pub use file::*;
pub use health::*;

use crate::file::{VaultService, DEFAULT_MAX_FILE_SIZE};
use crate::web::error::ApiError;
use crate::VaultError;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// File service over the storage root.
    pub vault: VaultService,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Fixed public origin for file URLs, if configured.
    pub public_url: Option<String>,
    /// Include internal error detail in error responses.
    pub expose_error_detail: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(vault: VaultService) -> Self {
        Self {
            vault,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
            public_url: None,
            expose_error_detail: false,
        }
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Use a fixed public origin for file URLs.
    pub fn with_public_url(mut self, url: Option<String>) -> Self {
        self.public_url = url;
        self
    }

    /// Include internal error detail in error responses.
    pub fn with_error_detail(mut self, expose: bool) -> Self {
        self.expose_error_detail = expose;
        self
    }

    /// Convert a service error into an API error, adding detail in development mode.
    pub fn api_error(&self, err: VaultError) -> ApiError {
        let detail = self.expose_error_detail.then(|| err.to_string());
        let api_error = ApiError::from(err);
        match detail {
            Some(detail) => api_error.with_detail(detail),
            None => api_error,
        }
    }
}
