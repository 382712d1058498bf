//! Runtime configuration from the environment.
//!
//! Values come from process environment variables, with a `.env` file in the
//! working directory loaded first when present.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::paths;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ROWS: &str = "10";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const URL_VAR: &str = "DUMMYDATA_URL";
const DOWNLOAD_DIR_VAR: &str = "DUMMYDATA_DOWNLOAD_DIR";
const ROWS_VAR: &str = "DUMMYDATA_ROWS";
const TIMEOUT_VAR: &str = "DUMMYDATA_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must not be empty")]
    Empty { name: &'static str },

    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the generation backend.
    pub server_url: String,
    /// Directory exported artifacts are saved into.
    pub download_dir: PathBuf,
    /// Initial row count text.
    pub rows: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// DDL file to upload on startup.
    pub ddl_path: Option<String>,
}

impl Config {
    /// Loads `.env`, then reads the environment and the first CLI argument.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        Self::from_lookup(|name| std::env::var(name).ok(), std::env::args().nth(1))
    }

    /// Builds a config from a variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        ddl_path: Option<String>,
    ) -> Result<Self, ConfigError> {
        let server_url = match lookup(URL_VAR) {
            Some(url) if url.trim().is_empty() => return Err(ConfigError::Empty { name: URL_VAR }),
            Some(url) => url.trim().to_string(),
            None => DEFAULT_SERVER_URL.to_string(),
        };

        let download_dir = lookup(DOWNLOAD_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .or_else(paths::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let rows = lookup(ROWS_VAR).unwrap_or_else(|| DEFAULT_ROWS.to_string());

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout {
                    name: TIMEOUT_VAR,
                    value,
                })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            server_url,
            download_dir,
            rows,
            timeout,
            ddl_path: ddl_path.filter(|path| !path.is_empty()),
        })
    }
}
