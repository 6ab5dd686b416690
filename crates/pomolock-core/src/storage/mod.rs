mod config;

pub use config::Config;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomolock[-dev]/` based on POMOLOCK_ENV.
///
/// Set POMOLOCK_ENV=dev to use development data directory. The directory is
/// not created here; [`Config::save_to`] creates it on first write.
///
/// # Errors
/// Returns an error if the home directory cannot be determined.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or(ConfigError::NoDataDir)?
        .join(".config");

    let env = std::env::var("POMOLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomolock-dev")
    } else {
        base_dir.join("pomolock")
    };

    Ok(dir)
}
