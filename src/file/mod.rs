//! File storage module for Cloud Vault.
//!
//! This module provides the server side of the vault:
//! - The storage root and its staged, no-clobber writes
//! - Collision-resistant stored names
//! - Ingestion, catalog listing and retrieval

mod descriptor;
pub mod naming;
mod service;
mod storage;

pub use descriptor::{CatalogEntry, FileDescriptor, FileLinks, UPLOADS_PATH};
pub use service::{StoredFile, VaultService};
pub use storage::{is_valid_stored_name, PendingWrite, StorageDirectory};

/// Maximum length for the sanitized original name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 100;

/// Longest stored name accepted by the storage root, in bytes.
pub const MAX_STORED_NAME_BYTES: usize = 255;

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
