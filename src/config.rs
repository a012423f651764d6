//! Shell configuration.
//!
//! Loaded from a TOML file when one is given or found in the working directory,
//! otherwise defaults. Command-line flags override whatever was loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::json::DEFAULT_CATALOG_FILE;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "primitive_db.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the catalog and the `data/` row files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Print elapsed time after every command.
    #[serde(default)]
    pub timing: bool,

    /// Cached select results kept in memory; 0 disables the cache.
    #[serde(default = "default_cache_entries")]
    pub cache_entries: usize,

    #[serde(default)]
    pub history_file: Option<PathBuf>,

    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_catalog_file() -> String {
    DEFAULT_CATALOG_FILE.to_string()
}

fn default_cache_entries() -> usize {
    128
}

fn default_history_size() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_file: default_catalog_file(),
            timing: false,
            cache_entries: default_cache_entries(),
            history_file: None,
            history_size: default_history_size(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `primitive_db.toml` from the working directory if present.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// History file, falling back to the platform's local data directory.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("primitive_db").join("history")))
    }
}
