use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use board_core::PROJECTS_PER_PAGE;
use board_engine::RemoteSettings;
use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "board.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings read from `board.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub refresh_interval_secs: u64,
    pub page_size: usize,
    pub page_duration_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            cache_dir: PathBuf::from(".board_cache"),
            refresh_interval_secs: 10,
            page_size: PROJECTS_PER_PAGE,
            page_duration_secs: 10,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            log_destination: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn remote_settings(&self) -> RemoteSettings {
        RemoteSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn page_duration(&self) -> Duration {
        Duration::from_secs(self.page_duration_secs.max(1))
    }
}
