//! Diagnostics infrastructure.
//!
//! Structured, async-aware logging built on `tracing` and
//! `tracing-subscriber`. Every event is routed to two sinks at once:
//!
//! - the operational console (stderr, ANSI-colored compact format)
//! - a persistent append-mode log file (plain text)
//!
//! so an operator watching the rig and a post-mortem reader of the log file
//! see the same backlog warnings and adverse-status reports. Filtering is
//! environment-based (`RUST_LOG`) with the configured level as the fallback.

use crate::config::Settings;
use crate::error::{AppResult, DaqError};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize diagnostics from loaded settings.
///
/// Reads the log level and log file path from [`Settings`] and installs a
/// global subscriber with both sinks attached.
pub fn init_from_settings(settings: &Settings) -> AppResult<()> {
    let level = parse_log_level(&settings.application.log_level)?;
    init(level, &settings.application.log_file)
}

/// Initialize diagnostics with an explicit level and log file path.
///
/// This function is idempotent - if a global subscriber is already installed
/// it returns Ok(()) without error, which makes it safe to call in tests.
pub fn init(level: Level, log_file: &Path) -> AppResult<()> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_string(level)));

    let console_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .or_else(|e| {
            // A second init is expected in tests and multi-component setups.
            if e.to_string()
                .contains("a global default trace dispatcher has already been set")
            {
                Ok(())
            } else {
                Err(DaqError::Diagnostics(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        })
}

/// Parse a log level string into a tracing [`Level`].
pub fn parse_log_level(level: &str) -> AppResult<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(DaqError::Configuration(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

fn level_to_filter_string(level: Level) -> String {
    match level {
        Level::TRACE => "trace".to_string(),
        Level::DEBUG => "debug".to_string(),
        Level::INFO => "info".to_string(),
        Level::WARN => "warn".to_string(),
        Level::ERROR => "error".to_string(),
    }
}
