//! Core error types for pomolock-core.
//!
//! Configuration problems are recovered close to where they happen and
//! platform failures (notifications, screen lock) are logged and dropped,
//! so most of these only surface through the CLI's config commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the countdown driver's control surface.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The countdown driver task is gone and can no longer take commands
    #[error("Timer driver is no longer running")]
    DriverClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not name a configuration field
    #[error(
        "Unknown configuration key: {0} (expected work_time, short_break, long_break, cycles or auto_lock)"
    )]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home directory could not be determined
    #[error("Could not determine a data directory for the configuration")]
    NoDataDir,
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Field must be greater than zero
    #[error("'{field}' must be greater than 0")]
    NonPositive { field: String },

    /// Field is outside its allowed range
    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Notification and screen-lock errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Desktop notification backend refused or is missing
    #[error("Desktop notification failed: {0}")]
    Notification(String),

    /// Lock command ran but reported failure
    #[error("Lock command '{command}' exited with {status}")]
    LockFailed { command: String, status: String },

    /// No known lock command for this platform
    #[error("Screen lock is not supported on {platform}")]
    LockUnsupported { platform: String },

    /// Lock command could not be started
    #[error("Failed to spawn lock command: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<notify_rust::error::Error> for NotifyError {
    fn from(err: notify_rust::error::Error) -> Self {
        NotifyError::Notification(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
