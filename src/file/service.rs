//! File service for Cloud Vault.
//!
//! This module provides the high-level operations behind the HTTP surface:
//! - Ingestion of one uploaded file under a fresh stored name
//! - The catalog listing, derived from the storage root on every call
//! - Retrieval of a stored file by name

use chrono::Utc;

use crate::Result;

use super::descriptor::{CatalogEntry, FileDescriptor, FileLinks};
use super::naming::generate_stored_name;
use super::storage::{PendingWrite, StorageDirectory};

/// Contents of a stored file.
#[derive(Debug)]
pub struct StoredFile {
    /// Stored name.
    pub stored_name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl StoredFile {
    /// MIME type guessed from the stored name.
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.stored_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

/// File service over one storage root.
#[derive(Debug, Clone)]
pub struct VaultService {
    storage: StorageDirectory,
}

impl VaultService {
    /// Create a new VaultService.
    pub fn new(storage: StorageDirectory) -> Self {
        Self { storage }
    }

    /// The underlying storage directory.
    pub fn storage(&self) -> &StorageDirectory {
        &self.storage
    }

    /// Start staging an upload.
    ///
    /// Callers that receive the payload incrementally write it into the
    /// returned [`PendingWrite`] and hand it to [`complete_upload`](Self::complete_upload).
    pub async fn begin_upload(&self) -> Result<PendingWrite> {
        self.storage.begin_write().await
    }

    /// Publish a staged upload under a fresh stored name.
    pub async fn complete_upload(
        &self,
        pending: PendingWrite,
        original_name: &str,
        links: &FileLinks,
    ) -> Result<FileDescriptor> {
        let stored_name = generate_stored_name(original_name);
        let size_bytes = pending.commit(&stored_name).await?;

        tracing::info!(
            stored_name = %stored_name,
            size_bytes,
            "File ingested"
        );

        Ok(FileDescriptor {
            url: links.url_for(&stored_name),
            stored_name,
            original_name: original_name.to_string(),
            size_bytes,
            uploaded_at: Utc::now(),
        })
    }

    /// Ingest an in-memory payload.
    pub async fn ingest(
        &self,
        original_name: &str,
        content: &[u8],
        links: &FileLinks,
    ) -> Result<FileDescriptor> {
        let mut pending = self.begin_upload().await?;
        pending.write_chunk(content).await?;
        self.complete_upload(pending, original_name, links).await
    }

    /// Current catalog of stored files.
    pub async fn catalog(&self, links: &FileLinks) -> Result<Vec<CatalogEntry>> {
        let names = self.storage.list_files().await?;
        Ok(names.into_iter().map(|name| links.entry_for(name)).collect())
    }

    /// Load a stored file by name.
    pub async fn open(&self, stored_name: &str) -> Result<StoredFile> {
        let content = self.storage.read(stored_name).await?;
        Ok(StoredFile {
            stored_name: stored_name.to_string(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VaultError;
    use tempfile::TempDir;

    async fn setup_service() -> (TempDir, VaultService) {
        let temp_dir = TempDir::new().unwrap();
        let storage = StorageDirectory::open(temp_dir.path()).await.unwrap();
        (temp_dir, VaultService::new(storage))
    }

    fn links() -> FileLinks {
        FileLinks::new("http://localhost:3000")
    }

    #[tokio::test]
    async fn test_ingest_returns_descriptor() {
        let (_temp_dir, service) = setup_service().await;

        let descriptor = service.ingest("a.txt", b"hello", &links()).await.unwrap();

        assert_eq!(descriptor.original_name, "a.txt");
        assert_eq!(descriptor.size_bytes, 5);
        assert!(descriptor.stored_name.ends_with("-a.txt"));
        assert_eq!(
            descriptor.url,
            format!("http://localhost:3000/uploads/{}", descriptor.stored_name)
        );
    }

    #[tokio::test]
    async fn test_ingest_then_catalog_then_open() {
        let (_temp_dir, service) = setup_service().await;

        let a = service.ingest("a.txt", b"hello", &links()).await.unwrap();
        let b = service.ingest("b.txt", b"world", &links()).await.unwrap();

        let catalog = service.catalog(&links()).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.iter().any(|e| e.name == a.stored_name && e.url == a.url));
        assert!(catalog.iter().any(|e| e.name == b.stored_name && e.url == b.url));

        assert_eq!(service.open(&a.stored_name).await.unwrap().content, b"hello");
        assert_eq!(service.open(&b.stored_name).await.unwrap().content, b"world");
    }

    #[tokio::test]
    async fn test_ingest_sanitizes_hostile_name() {
        let (temp_dir, service) = setup_service().await;

        let descriptor = service
            .ingest("../../outside.txt", b"x", &links())
            .await
            .unwrap();

        assert!(descriptor.stored_name.ends_with("-outside.txt"));
        assert_eq!(descriptor.original_name, "../../outside.txt");
        assert!(temp_dir.path().join(&descriptor.stored_name).is_file());
        assert!(!temp_dir.path().parent().unwrap().join("outside.txt").exists());
    }

    #[tokio::test]
    async fn test_chunked_upload() {
        let (_temp_dir, service) = setup_service().await;

        let mut pending = service.begin_upload().await.unwrap();
        pending.write_chunk(b"hel").await.unwrap();
        pending.write_chunk(b"lo").await.unwrap();
        let descriptor = service
            .complete_upload(pending, "s.txt", &links())
            .await
            .unwrap();

        assert_eq!(descriptor.size_bytes, 5);
        assert_eq!(
            service.open(&descriptor.stored_name).await.unwrap().content,
            b"hello"
        );
    }

    #[tokio::test]
    async fn test_abandoned_upload_leaves_nothing_behind() {
        let (temp_dir, service) = setup_service().await;

        let mut pending = service.begin_upload().await.unwrap();
        pending.write_chunk(b"partial").await.unwrap();
        drop(pending);

        assert!(service.catalog(&links()).await.unwrap().is_empty());
        let staged = std::fs::read_dir(temp_dir.path().join(".partial"))
            .unwrap()
            .count();
        assert_eq!(staged, 0);
    }

    #[tokio::test]
    async fn test_ingest_long_multibyte_name() {
        let (_temp_dir, service) = setup_service().await;
        let original = format!("{}.txt", "日".repeat(70));

        let descriptor = service.ingest(&original, b"hello", &links()).await.unwrap();

        assert_eq!(descriptor.original_name, original);
        assert!(descriptor.stored_name.len() <= 255);
        assert_eq!(
            service.open(&descriptor.stored_name).await.unwrap().content,
            b"hello"
        );
        let catalog = service.catalog(&links()).await.unwrap();
        assert_eq!(catalog[0].name, descriptor.stored_name);
    }

    #[tokio::test]
    async fn test_concurrent_ingest_same_name() {
        let (_temp_dir, service) = setup_service().await;
        let links = links();

        let (first, second) = tokio::join!(
            service.ingest("same.txt", b"one", &links),
            service.ingest("same.txt", b"two", &links),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first.stored_name, second.stored_name);
        assert_eq!(service.open(&first.stored_name).await.unwrap().content, b"one");
        assert_eq!(service.open(&second.stored_name).await.unwrap().content, b"two");
    }

    #[tokio::test]
    async fn test_catalog_empty() {
        let (_temp_dir, service) = setup_service().await;
        assert!(service.catalog(&links()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_not_found() {
        let (_temp_dir, service) = setup_service().await;

        let result = service.open("missing.txt").await;
        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[test]
    fn test_content_type() {
        let file = StoredFile {
            stored_name: "1-x-report.pdf".to_string(),
            content: vec![],
        };
        assert_eq!(file.content_type(), "application/pdf");

        let file = StoredFile {
            stored_name: "1-x-blob".to_string(),
            content: vec![],
        };
        assert_eq!(file.content_type(), "application/octet-stream");
    }
}
