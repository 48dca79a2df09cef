//! Error types for Cloud Vault.

use thiserror::Error;

/// Common error type for Cloud Vault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An upload request carried no file attachment.
    #[error("no file uploaded")]
    MissingFile,

    /// The storage root could not be enumerated.
    #[error("unable to scan files: {0}")]
    DirectoryUnreadable(#[source] std::io::Error),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A stored name is already taken.
    #[error("stored name already exists: {0}")]
    Conflict(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error talking to a vault server from the client side.
    #[error("transport error: {0}")]
    Transport(String),

    /// An outgoing call exceeded its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// An outgoing call was aborted before it completed.
    #[error("request cancelled")]
    Cancelled,
}

/// Result type alias for Cloud Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
