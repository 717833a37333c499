mod config;
pub mod state_store;

pub use config::{Config, LearnerConfig, TutorConfig};
pub use state_store::StateStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/linguist[-dev]/` based on LINGUIST_ENV.
///
/// Set LINGUIST_ENV=dev to use the development data directory, or
/// LINGUIST_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("LINGUIST_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LINGUIST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("linguist-dev")
            } else {
                base_dir.join("linguist")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
