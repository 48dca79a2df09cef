//! Web server for Cloud Vault.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::file::VaultService;
use crate::{Result, VaultError};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the API, the stored files and the bundled client.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application router.
    router: Router,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, vault: VaultService) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                VaultError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        let app_state = AppState::new(vault)
            .with_max_upload_size(config.files.max_upload_size_bytes())
            .with_public_url(config.web.public_url.clone())
            .with_error_detail(config.web.expose_error_detail);

        if app_state.expose_error_detail {
            tracing::warn!("Development mode: internal error detail is included in responses");
        }

        let router = create_router(Arc::new(app_state), &config.web).layer(CompressionLayer::new());

        Ok(Self { addr, router })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Server running on http://{}", local_addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Server running on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, self.router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
