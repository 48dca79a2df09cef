//! Router configuration for the web API.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::WebConfig;
use crate::file::UPLOADS_PATH;

use super::handlers::{health_check, list_files, serve_upload, unhandled_route, upload_file, AppState};
use super::middleware::create_cors_layer;
use super::openapi::openapi_json;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main router.
///
/// Unmatched requests go to the bundled client when it is enabled and
/// present on disk, and get a JSON 404 otherwise.
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/files", get(list_files))
        .route("/openapi.json", get(openapi_json));

    let router = Router::new()
        .nest("/api", api_routes)
        .route(
            &format!("{UPLOADS_PATH}/:name"),
            get(serve_upload).layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            )),
        )
        .with_state(app_state)
        .merge(create_health_router());

    let router = match create_static_service(web_config) {
        Some(static_service) => router.fallback_service(static_service),
        None => router.fallback(unhandled_route),
    };

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&web_config.cors_origins)),
    )
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Serve the bundled client, falling back to its `index.html` for client-side routes.
fn create_static_service(web_config: &WebConfig) -> Option<ServeDir<ServeFile>> {
    if !web_config.serve_static {
        return None;
    }

    let static_path = Path::new(&web_config.static_path);
    if !static_path.is_dir() {
        tracing::debug!(
            "Client bundle not found at {}, serving API only",
            static_path.display()
        );
        return None;
    }

    tracing::info!("Serving client bundle from {}", static_path.display());
    let index = ServeFile::new(static_path.join("index.html"));
    Some(ServeDir::new(static_path).fallback(index))
}
