use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SUDOKU_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "sudoku.json";

const BIND_ENV: &str = "SUDOKU_BIND";
const DATA_DIR_ENV: &str = "SUDOKU_DATA_DIR";
const UPLOAD_DIR_ENV: &str = "SUDOKU_UPLOAD_DIR";

/// Server configuration, read from a JSON file with environment overrides.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Directory holding NormalSudokus.sudoku and XSudokus.sudoku
    pub data_dir: PathBuf,

    /// Directory receiving one file per accepted upload
    pub upload_dir: PathBuf,

    /// Recipient named in upload notifications
    pub notify_address: String,

    pub max_upload_puzzles: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            upload_dir: PathBuf::from("uploads"),
            notify_address: "puzzles@localhost".to_string(),
            max_upload_puzzles: 1000,
        }
    }
}

impl Config {
    /// Load config from the given file, or return defaults if not found
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the config file from `SUDOKU_CONFIG`, then apply env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(BIND_ENV) {
            self.bind_addr = value.parse().map_err(|_| ConfigError::Invalid {
                key: BIND_ENV,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(UPLOAD_DIR_ENV) {
            self.upload_dir = PathBuf::from(value);
        }
        Ok(())
    }
}
