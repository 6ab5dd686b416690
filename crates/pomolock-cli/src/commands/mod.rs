pub mod config;
pub mod countdown;
pub mod cycle;

use std::path::{Path, PathBuf};

use pomolock_core::{Config, ConfigError};

/// The `--config` path if given, otherwise the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::path(),
    }
}

/// Single-threaded runtime for the commands that count down.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
