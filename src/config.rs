//! Server configuration.
//!
//! Precedence: CLI flag > environment (`GITLAB_URL`, `GITLAB_TOKEN`,
//! `GITLAB_API_VERSION`, `GITLAB_CONFIG`) > config file (YAML or JSON) > defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "v4";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub token: String,
    pub api_version: String,
    /// Emit url / status / payload of every call.
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no GitLab server URL configured (use --url, GITLAB_URL or a config file)")]
    MissingUrl,
    #[error("no access token configured (use --token, GITLAB_TOKEN or a config file)")]
    MissingToken,
    #[error("invalid GitLab server URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// On-disk shape. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub api_version: Option<String>,
    pub debug: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let lower = path.to_string_lossy().to_ascii_lowercase();
        let parsed = if lower.ends_with(".json") {
            serde_json::from_str(raw).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(raw).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Values gathered from flags and environment, before the file is consulted.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub token: Option<String>,
    pub api_version: Option<String>,
    pub config: Option<PathBuf>,
    pub debug: bool,
    /// Per-call token, used only when no default token is configured.
    pub call_token: Option<String>,
}

impl Overrides {
    /// Fill unset values from the process environment.
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if self.url.is_none() {
            self.url = get("GITLAB_URL");
        }
        if self.token.is_none() {
            self.token = get("GITLAB_TOKEN");
        }
        if self.api_version.is_none() {
            self.api_version = get("GITLAB_API_VERSION");
        }
        if self.config.is_none() {
            self.config = get("GITLAB_CONFIG").map(PathBuf::from);
        }
        self
    }

    /// Read the config file (if any) and produce the final [`Config`].
    pub fn load(self) -> Result<Config, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    fn merge(self, file: FileConfig) -> Result<Config, ConfigError> {
        let url = self.url.or(file.url).ok_or(ConfigError::MissingUrl)?;
        let token = self
            .token
            .or(file.token)
            .filter(|t| !t.is_empty())
            .or(self.call_token.filter(|t| !t.trim().is_empty()))
            .ok_or(ConfigError::MissingToken)?;
        let base_url = Url::parse(url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: url.clone(),
            source,
        })?;
        let api_version = self
            .api_version
            .or(file.api_version)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        Ok(Config {
            base_url,
            token,
            api_version,
            debug: self.debug || file.debug.unwrap_or(false),
        })
    }
}
