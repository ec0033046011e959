//! Custom error types for the application.
//!
//! This module defines the primary error type, `DaqError`, for the entire crate.
//! Using the `thiserror` crate, it provides a centralized and consistent way to
//! handle the errors that can occur while bringing a session up: configuration
//! parsing and validation, log-sink setup, and lookup-table construction.
//!
//! Adverse acquisition statuses (stop/abort/timeout/wait-failed/queue-empty)
//! are deliberately *not* errors. They are in-band hardware conditions handled
//! inside the integration loop, which always returns normally with a
//! [`SessionReport`](crate::acquisition::SessionReport) describing how the
//! session ended.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, DaqError>;

/// Errors raised while configuring and starting an acquisition session.
#[derive(Error, Debug)]
pub enum DaqError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration parsed but carries semantically invalid values.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// File or terminal I/O failure while setting up a diagnostics sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A correction table does not cover the full sample domain.
    #[error("Lookup table error: {0}")]
    Lut(String),

    /// The tracing subscriber could not be installed.
    #[error("Diagnostics setup error: {0}")]
    Diagnostics(String),
}
