use std::process::ExitCode;

use tracing::{error, info};

use cloud_vault::web::WebServer;
use cloud_vault::{Config, StorageDirectory, VaultService};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = config.apply_env_overrides() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = cloud_vault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        cloud_vault::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Cloud Vault - File upload and retrieval service");

    let storage = match StorageDirectory::open(&config.files.storage_path).await {
        Ok(storage) => storage,
        Err(e) => {
            error!(
                "Failed to prepare storage directory {}: {}",
                config.files.storage_path, e
            );
            return ExitCode::FAILURE;
        }
    };
    info!("Storing files in {}", storage.root().display());

    let server = match WebServer::new(&config, VaultService::new(storage)) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    };

    match server.run_until(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
