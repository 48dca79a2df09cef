//! API error handling for the Cloud Vault web surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::VaultError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request (400).
    BadRequest,
    /// Upload request without a file attachment (400).
    MissingFile,
    /// Unknown stored name or rejected path (404).
    NotFound,
    /// No route matched (404).
    UnhandledRoute,
    /// Stored name already taken (409).
    Conflict,
    /// Upload exceeds the configured size limit (413).
    PayloadTooLarge,
    /// Storage root could not be enumerated (500).
    DirectoryUnreadable,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::MissingFile => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound | ErrorCode::UnhandledRoute => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::DirectoryUnreadable | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Internal error text (development mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach internal detail to the response.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a missing file error.
    pub fn missing_file() -> Self {
        Self::new(ErrorCode::MissingFile, "No file uploaded")
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create the catch-all route error.
    pub fn unhandled_route() -> Self {
        Self::new(ErrorCode::UnhandledRoute, "Not found")
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                detail: self.detail,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        match &err {
            VaultError::MissingFile => ApiError::missing_file(),
            VaultError::NotFound(_) => ApiError::not_found("File not found"),
            VaultError::Validation(msg) => ApiError::bad_request(msg.clone()),
            VaultError::Conflict(_) => {
                tracing::error!("Stored name collision: {}", err);
                ApiError::new(ErrorCode::Conflict, "A file with this name already exists")
            }
            VaultError::DirectoryUnreadable(_) => {
                tracing::error!("Failed to list files: {}", err);
                ApiError::new(ErrorCode::DirectoryUnreadable, "Unable to scan files")
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::UnhandledRoute.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::DirectoryUnreadable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_vault_error() {
        assert_eq!(
            ApiError::from(VaultError::MissingFile).code(),
            ErrorCode::MissingFile
        );
        assert_eq!(
            ApiError::from(VaultError::NotFound("File: x".to_string())).code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            ApiError::from(VaultError::Conflict("x".to_string())).code(),
            ErrorCode::Conflict
        );

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ApiError::from(VaultError::DirectoryUnreadable(io_err));
        assert_eq!(err.code(), ErrorCode::DirectoryUnreadable);
        assert_eq!(err.message, "Unable to scan files");
        assert!(err.detail.is_none());
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let io_err = std::io::Error::other("disk on fire");
        let err = ApiError::from(VaultError::Io(io_err));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!err.message.contains("disk on fire"));
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: ErrorCode::MissingFile,
                message: "No file uploaded".to_string(),
                detail: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "MISSING_FILE");
        assert_eq!(json["error"]["message"], "No file uploaded");
        assert!(json["error"].get("detail").is_none());
    }
}
