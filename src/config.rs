use crate::workflow::history::DEFAULT_HISTORY_LIMIT;
use crate::workflow::Milestones;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

pub const CONFIG_PATH_ENV: &str = "SUBTITLE_CLIENT_CONFIG";
const SERVER_URL_ENV: &str = "SUBTITLE_SERVER_URL";
const TIMEOUT_ENV: &str = "SUBTITLE_TIMEOUT_SECS";
const DOWNLOAD_DIR_ENV: &str = "SUBTITLE_DOWNLOAD_DIR";
const HISTORY_LIMIT_ENV: &str = "SUBTITLE_HISTORY_LIMIT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid server URL '{0}'")]
    InvalidServerUrl(String),

    #[error("Progress milestones must increase and end at or below 100 (got {0:?})")]
    InvalidMilestones(Milestones),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// Unset leaves request timing to the transport
    pub timeout_secs: Option<u64>,
    pub download_dir: PathBuf,
    pub history_limit: usize,
    pub milestones: Milestones,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_secs: None,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            history_limit: DEFAULT_HISTORY_LIMIT,
            milestones: Milestones::default(),
        }
    }
}

impl ClientConfig {
    /// Config file named by `SUBTITLE_CLIENT_CONFIG` (if any), then environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SERVER_URL_ENV) {
            self.server_url = url;
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(0) => self.timeout_secs = None,
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid {}='{}'", TIMEOUT_ENV, raw),
            }
        }

        if let Some(dir) = lookup(DOWNLOAD_DIR_ENV) {
            self.download_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(HISTORY_LIMIT_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(limit) => self.history_limit = limit,
                Err(_) => tracing::warn!("Ignoring invalid {}='{}'", HISTORY_LIMIT_ENV, raw),
            }
        }
    }

    pub fn normalize(&mut self) {
        self.server_url = normalize_server_url(&self.server_url);
        if self.download_dir.as_os_str().is_empty() {
            self.download_dir = PathBuf::from(DEFAULT_DOWNLOAD_DIR);
        }
        if self.history_limit == 0 {
            self.history_limit = DEFAULT_HISTORY_LIMIT;
        }
        if self.timeout_secs == Some(0) {
            self.timeout_secs = None;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.milestones.is_valid() {
            return Err(ConfigError::InvalidMilestones(self.milestones));
        }
        self.server_base().map(|_| ())
    }

    pub fn server_base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.server_url)
            .map_err(|_| ConfigError::InvalidServerUrl(self.server_url.clone()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::InvalidServerUrl(self.server_url.clone())),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SERVER_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
