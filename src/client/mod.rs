//! Client side of Cloud Vault.
//!
//! [`HttpVaultClient`] talks to a running server; [`UploadController`]
//! holds the drop-zone state a front end renders.

mod controller;
mod transport;

pub use controller::{
    UploadController, UploadPhase, ViewState, LIST_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
pub use transport::{HttpVaultClient, LocalFile, VaultApi, DEFAULT_TIMEOUT};
