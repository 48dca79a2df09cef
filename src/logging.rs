//! Logging setup.
//!
//! `RUST_LOG` directives, when present, are layered on top of the level
//! from `[logging]`.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, VaultError};

/// Map a configured level name to a filter. Unknown names mean `info`.
fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => LevelFilter::OFF,
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(parse_level(level).into())
        .from_env_lossy()
}

fn open_log_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(File::options().create(true).append(true).open(path)?)
}

/// Install the global subscriber.
///
/// Events always go to stdout. With `file` set they are appended there too,
/// without ANSI colours.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);

    let installed = match config.file.as_deref() {
        None => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(true),
            )
            .with(filter)
            .try_init(),
        Some(path) => {
            let log_file = Arc::new(open_log_file(path)?);
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stdout.and(log_file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .with(filter)
                .try_init()
        }
    };

    installed.map_err(|e| VaultError::Config(format!("failed to install logger: {e}")))
}

/// Console-only logging, used when [`init`] fails. Does nothing if a
/// subscriber is already installed.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .try_init();
}
