//! Client-side access to a vault server.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};

use crate::file::CatalogEntry;
use crate::web::dto::{FileListResponse, UploadResponse};
use crate::web::error::{ErrorBody, ErrorCode};
use crate::web::handlers::FILE_FIELD;
use crate::{Result, VaultError};

/// Default deadline for one outgoing call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A file picked or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// File name as shown to the user.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl LocalFile {
    /// Create a new local file.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Operations the upload controller needs from a server.
pub trait VaultApi {
    /// Submit one file for ingestion.
    fn upload(&self, file: &LocalFile) -> impl Future<Output = Result<UploadResponse>> + Send;

    /// Fetch the current catalog.
    fn list_files(&self) -> impl Future<Output = Result<Vec<CatalogEntry>>> + Send;
}

/// HTTP implementation of [`VaultApi`].
#[derive(Debug, Clone)]
pub struct HttpVaultClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpVaultClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose calls give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, e: reqwest::Error) -> VaultError {
        if e.is_timeout() {
            VaultError::Timeout(self.timeout)
        } else {
            VaultError::Transport(e.to_string())
        }
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(error_from_body(status, response.json::<ErrorBody>().await.ok()))
    }
}

/// Map a non-success response to a client error.
fn error_from_body(status: StatusCode, body: Option<ErrorBody>) -> VaultError {
    let Some(body) = body else {
        let reason = status.canonical_reason().unwrap_or("unexpected response");
        return VaultError::Transport(format!("{status}: {reason}"));
    };

    match body.error.code {
        ErrorCode::MissingFile => VaultError::MissingFile,
        ErrorCode::NotFound => VaultError::NotFound(body.error.message),
        ErrorCode::Conflict => VaultError::Conflict(body.error.message),
        ErrorCode::BadRequest => VaultError::Validation(body.error.message),
        _ => VaultError::Transport(format!("{status}: {}", body.error.message)),
    }
}

impl VaultApi for HttpVaultClient {
    async fn upload(&self, file: &LocalFile) -> Result<UploadResponse> {
        let part = Part::bytes(file.content.clone()).file_name(file.name.clone());
        let form = Form::new().part(FILE_FIELD, part);

        let response = self
            .http
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.check_status(response)
            .await?
            .json::<UploadResponse>()
            .await
            .map_err(|e| self.transport_error(e))
    }

    async fn list_files(&self) -> Result<Vec<CatalogEntry>> {
        let response = self
            .http
            .get(format!("{}/api/files", self.base_url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self
            .check_status(response)
            .await?
            .json::<FileListResponse>()
            .await
            .map_err(|e| self.transport_error(e))?;

        Ok(body.files)
    }
}
