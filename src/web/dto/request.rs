//! Request DTOs for the web API.

use utoipa::ToSchema;

/// Shape of the multipart upload body, for the API description.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to store.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
