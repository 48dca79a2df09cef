//! On-disk storage directory for Cloud Vault.
//!
//! Every upload becomes one regular file directly under the root:
//! ```text
//! {root}/
//! ├── .partial/                                   staging area, never listed
//! │   └── 3f2a....part
//! ├── 1700000000000-0f1e...-a.txt
//! └── 1700000000123-9c8b...-b.txt
//! ```
//! Writes are staged in `.partial/` and published with a no-clobber hard
//! link, so a stored name is either absent or holds its complete payload.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{Result, VaultError};

use super::MAX_STORED_NAME_BYTES;

/// Name of the staging sub-directory inside the root.
const STAGING_DIR: &str = ".partial";

/// Handle to the storage root.
#[derive(Debug, Clone)]
pub struct StorageDirectory {
    root: PathBuf,
}

impl StorageDirectory {
    /// Create a handle without touching the filesystem.
    ///
    /// Call [`ensure_exists`](Self::ensure_exists) before first use, or use
    /// [`open`](Self::open) which does both.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a handle and make sure the root exists.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self::new(root);
        storage.ensure_exists().await?;
        Ok(storage)
    }

    /// Get the root path of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn staging_path(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Create the root (and any missing parents) plus the staging area.
    ///
    /// Idempotent. Losing a creation race to another caller is not an error.
    pub async fn ensure_exists(&self) -> Result<()> {
        create_dir_tolerant(&self.root).await?;
        create_dir_tolerant(&self.staging_path()).await?;
        Ok(())
    }

    /// Start staging a new file.
    pub async fn begin_write(&self) -> Result<PendingWrite> {
        let temp_path = self
            .staging_path()
            .join(format!("{}.part", Uuid::new_v4().simple()));

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await?;

        Ok(PendingWrite {
            file: Some(file),
            temp_path,
            root: self.root.clone(),
            written: 0,
            published: false,
        })
    }

    /// Enumerate the stored names currently in the root.
    ///
    /// Only regular files are returned, sorted by name. Directories (including
    /// the staging area), symlinks and names that are not valid UTF-8 are
    /// skipped.
    pub async fn list_files(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(VaultError::DirectoryUnreadable)?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(VaultError::DirectoryUnreadable)?
        {
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    // Removed out-of-band between readdir and stat.
                    tracing::debug!(entry = ?entry.path(), error = %e, "Skipping vanished entry");
                    continue;
                }
            };
            if !file_type.is_file() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(name = ?raw, "Skipping stored file with non UTF-8 name");
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Resolve a stored name to its path, strictly inside the root.
    ///
    /// Names that are not a single plain path component, and names that do not
    /// refer to a regular file, are reported as `NotFound`.
    pub async fn resolve(&self, stored_name: &str) -> Result<PathBuf> {
        if !is_valid_stored_name(stored_name) {
            tracing::warn!(name = %stored_name.escape_debug(), "Rejected stored name");
            return Err(not_found(stored_name));
        }

        let path = self.root.join(stored_name);
        match fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(not_found(stored_name)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found(stored_name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the full contents of a stored file.
    pub async fn read(&self, stored_name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(stored_name).await?;

        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found(stored_name)),
            Err(e) => Err(e.into()),
        }
    }
}

/// A file being staged for publication.
///
/// Dropping a pending write without committing it removes the staged data.
#[derive(Debug)]
pub struct PendingWrite {
    file: Option<fs::File>,
    temp_path: PathBuf,
    root: PathBuf,
    written: u64,
    published: bool,
}

impl PendingWrite {
    /// Append a chunk to the staged file.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| VaultError::Io(io::Error::other("pending write already closed")))?;
        file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Number of bytes staged so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Publish the staged file under `stored_name` and return its size.
    ///
    /// Fails with `Conflict` if the name is already taken; the existing file is
    /// left untouched.
    pub async fn commit(mut self, stored_name: &str) -> Result<u64> {
        if !is_valid_stored_name(stored_name) {
            return Err(VaultError::Validation(format!(
                "invalid stored name: {}",
                stored_name.escape_debug()
            )));
        }

        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }

        let dest = self.root.join(stored_name);
        match fs::hard_link(&self.temp_path, &dest).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(VaultError::Conflict(stored_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        self.published = true;
        if let Err(e) = fs::remove_file(&self.temp_path).await {
            tracing::warn!(path = ?self.temp_path, error = %e, "Failed to remove staging file");
        }

        Ok(self.written)
    }

    /// Drop the staged data without publishing it.
    pub async fn discard(mut self) {
        self.file.take();
        if let Err(e) = fs::remove_file(&self.temp_path).await {
            tracing::warn!(path = ?self.temp_path, error = %e, "Failed to remove staging file");
        }
        self.published = true;
    }
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        if !self.published {
            self.file.take();
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}

/// Check that `name` is a single, plain, visible path component.
pub fn is_valid_stored_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_STORED_NAME_BYTES || name.starts_with('.') {
        return false;
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

async fn create_dir_tolerant(path: &Path) -> Result<()> {
    match fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn not_found(stored_name: &str) -> VaultError {
    VaultError::NotFound(format!("File: {stored_name}"))
}
