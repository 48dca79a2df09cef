//! Cloud Vault - File upload and retrieval service
//!
//! Accepts single-file uploads over HTTP, stores them under unique names,
//! lists what is stored and serves it back. The [`client`] module holds the
//! matching upload client.

pub mod client;
pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{Result, VaultError};
pub use file::{CatalogEntry, FileDescriptor, StorageDirectory, VaultService};
