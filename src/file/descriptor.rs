//! Records describing stored files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Path segment under which stored files are served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Descriptor of one ingested file, produced when its write commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Name of the file inside the storage root.
    pub stored_name: String,
    /// File name as supplied by the client.
    pub original_name: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
    /// Absolute URL the file is served from.
    pub url: String,
    /// Commit time.
    #[schema(value_type = String, format = DateTime)]
    pub uploaded_at: DateTime<Utc>,
}

/// One entry of the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    /// Stored name.
    pub name: String,
    /// Absolute URL the file is served from.
    pub url: String,
}

/// Builds retrieval URLs for stored names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLinks {
    origin: String,
}

impl FileLinks {
    /// Create a link builder for `origin` (e.g. `http://localhost:3000`).
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// The origin links are built against.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// URL of a stored file.
    pub fn url_for(&self, stored_name: &str) -> String {
        format!(
            "{}{}/{}",
            self.origin,
            UPLOADS_PATH,
            urlencoding::encode(stored_name)
        )
    }

    /// Catalog entry for a stored file.
    pub fn entry_for(&self, stored_name: impl Into<String>) -> CatalogEntry {
        let name = stored_name.into();
        let url = self.url_for(&name);
        CatalogEntry { name, url }
    }
}
