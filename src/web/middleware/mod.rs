//! Middleware and extractors for the web API.

pub mod cors;
pub mod origin;

pub use cors::create_cors_layer;
pub use origin::RequestLinks;
