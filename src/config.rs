//! Configuration module for Cloud Vault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";

/// Environment variable selecting the runtime mode (`development` exposes error detail).
pub const ENV_MODE: &str = "VAULT_ENV";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the storage root directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl FilesConfig {
    /// Maximum upload size in bytes, saturating at `u64::MAX`.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Web configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Allowed CORS origins (empty = any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the bundled client application.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to the bundled client build output.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Public origin used when building file URLs (e.g. `https://vault.example.com`).
    ///
    /// When unset, the origin is derived from each request's `Host` header.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Include internal error detail in error responses.
    #[serde(default)]
    pub expose_error_detail: bool,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "frontend/dist".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: default_serve_static(),
            static_path: default_static_path(),
            public_url: None,
            expose_error_detail: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORT`: listen port
    /// - `VAULT_ENV`: `development` turns on error detail in responses
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_PORT).ok().as_deref(),
            std::env::var(ENV_MODE).ok().as_deref(),
        )
    }

    fn apply_overrides(&mut self, port: Option<&str>, mode: Option<&str>) -> Result<()> {
        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|_| VaultError::Config(format!("invalid {ENV_PORT} value: {port}")))?;
        }

        if let Some(mode) = mode {
            if mode.eq_ignore_ascii_case("development") {
                self.web.expose_error_detail = true;
            }
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.storage_path.trim().is_empty() {
            return Err(VaultError::Validation(
                "files.storage_path must not be empty".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(VaultError::Validation(
                "files.max_upload_size_mb must be at least 1".to_string(),
            ));
        }
        if let Some(url) = &self.web.public_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(VaultError::Validation(format!(
                    "web.public_url must start with http:// or https://, got {url}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        assert_eq!(config.files.storage_path, "uploads");
        assert_eq!(config.files.max_upload_size_mb, 10);
        assert_eq!(config.files.max_upload_size_bytes(), 10 * 1024 * 1024);

        let huge = FilesConfig {
            max_upload_size_mb: u64::MAX,
            ..FilesConfig::default()
        };
        assert_eq!(huge.max_upload_size_bytes(), u64::MAX);

        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());

        assert!(config.web.cors_origins.is_empty());
        assert!(config.web.serve_static);
        assert_eq!(config.web.static_path, "frontend/dist");
        assert!(config.web.public_url.is_none());
        assert!(!config.web.expose_error_detail);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[files]
storage_path = "custom/uploads"
max_upload_size_mb = 20

[logging]
level = "debug"
file = "logs/vault.log"

[web]
cors_origins = ["http://localhost:5173"]
serve_static = false
static_path = "public"
public_url = "https://vault.example.com"
expose_error_detail = true
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.files.storage_path, "custom/uploads");
        assert_eq!(config.files.max_upload_size_mb, 20);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("logs/vault.log"));
        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert!(!config.web.serve_static);
        assert_eq!(config.web.static_path, "public");
        assert_eq!(
            config.web.public_url.as_deref(),
            Some("https://vault.example.com")
        );
        assert!(config.web.expose_error_detail);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 4000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.files.storage_path, "uploads");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[server]\nport = \"not a number\"");

        if let Err(VaultError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(VaultError::Io(_))));
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config.apply_overrides(Some("5050"), None).unwrap();
        assert_eq!(config.server.port, 5050);
    }

    #[test]
    fn test_empty_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(Some("  "), None).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(Some("eighty"), None);
        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn test_development_mode_exposes_detail() {
        let mut config = Config::default();
        config.apply_overrides(None, Some("Development")).unwrap();
        assert!(config.web.expose_error_detail);

        let mut config = Config::default();
        config.apply_overrides(None, Some("production")).unwrap();
        assert!(!config.web.expose_error_detail);
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_upload_size() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;
        assert!(matches!(config.validate(), Err(VaultError::Validation(_))));
    }

    #[test]
    fn test_validate_public_url_scheme() {
        let mut config = Config::default();
        config.web.public_url = Some("vault.example.com".to_string());
        let result = config.validate();
        if let Err(VaultError::Validation(msg)) = result {
            assert!(msg.contains("public_url"));
        } else {
            panic!("Expected Validation error");
        }
    }
}
