mod config;
pub mod database;

pub use config::{BridgeConfig, Config, StreakConfig, TimerConfig};
pub use database::{Database, Habit};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding config, habits and the shared store.
///
/// `MOMENTUM_DATA_DIR` overrides the location entirely. Otherwise this is
/// `~/.config/momentum[-dev]/`, with `MOMENTUM_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MOMENTUM_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MOMENTUM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("momentum-dev")
            } else {
                base_dir.join("momentum")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
