//! Configuration
//!
//! Settings are read from an optional JSON file, then overridden by
//! environment variables:
//!
//! - `LOCALITY_DATA_PATH`: location of the JSON data file
//! - `LOCALITY_IMPORT_CHUNK_SIZE`: records per upsert during imports
//!
//! Every field uses `#[serde(default)]` so partial files deserialize.

use crate::services::import::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

pub const DATA_PATH_ENV: &str = "LOCALITY_DATA_PATH";
pub const CHUNK_SIZE_ENV: &str = "LOCALITY_IMPORT_CHUNK_SIZE";

const DATA_DIR: &str = ".locality";
const DATA_FILE: &str = "localities.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityConfig {
    /// JSON file holding the locality table
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Records per upsert call when committing an import
    #[serde(default = "default_chunk_size")]
    pub import_chunk_size: usize,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            import_chunk_size: default_chunk_size(),
        }
    }
}

/// `~/.locality/localities.json`, or `localities.json` in the working
/// directory when no home directory is known
pub fn default_data_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DATA_DIR).join(DATA_FILE),
        None => PathBuf::from(DATA_FILE),
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl LocalityConfig {
    /// Load from `path` when given and present, apply environment
    /// overrides, then validate
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults
    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let exists = fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write to `path` atomically (write-to-temp, then rename)
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let temp_file = path.with_extension("json.tmp");
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(&temp_file, serialized).await.map_err(write_err)?;
        fs::rename(&temp_file, path).await.map_err(write_err)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// [`load`](Self::load))
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DATA_PATH_ENV).filter(|v| !v.is_empty()) {
            tracing::info!("Using data path from {}: {}", DATA_PATH_ENV, path);
            self.data_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(CHUNK_SIZE_ENV) {
            self.import_chunk_size = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: CHUNK_SIZE_ENV,
                message: format!("'{}' is not a positive integer", raw),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.import_chunk_size == 0 {
            return Err(ConfigError::Invalid {
                key: "import_chunk_size",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "data_path",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
