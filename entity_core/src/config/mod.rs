//! TOML configuration loading

mod stats;

pub use stats::{load_stat_definitions, parse_stat_definitions, StatsConfig};

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("Parse error in '{path:?}': {error}")]
    Parse {
        error: toml::de::Error,
        path: Option<PathBuf>,
    },
    #[error("Validation error in '{path:?}': {message}")]
    Validation {
        message: String,
        path: Option<PathBuf>,
    },
}

impl ConfigError {
    /// Attach the file a string-parsed config came from
    pub(crate) fn at(self, file: &Path) -> Self {
        match self {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                error,
                path: Some(file.to_path_buf()),
            },
            ConfigError::Validation { message, .. } => ConfigError::Validation {
                message,
                path: Some(file.to_path_buf()),
            },
            io => io,
        }
    }
}

/// Load and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        error: e,
        path: path.to_path_buf(),
    })?;
    parse_toml(&content).map_err(|e| e.at(path))
}

/// Deserialize a TOML string
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        error: e,
        path: None,
    })
}
