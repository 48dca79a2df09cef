//! Web API module for Cloud Vault.
//!
//! Serves the upload endpoint, the catalog listing, the stored files
//! themselves and, when present, the bundled browser client.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
