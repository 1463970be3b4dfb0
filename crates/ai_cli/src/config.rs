//! Persisted credentials and model selection.
//!
//! The file is validated once at the boundary: [`StoredConfig::required`]
//! turns the loose on-disk document into an [`AppConfig`] or lists every
//! missing key.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Models offered by `setup configure`.
pub const MODEL_CHOICES: [&str; 4] = ["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo", "gpt-4o"];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("error saving configuration file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "configuration missing required keys: {}. Run 'ai-cli setup configure' first.",
        .0.join(", ")
    )]
    MissingKeys(Vec<&'static str>),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

/// On-disk configuration document. Every field is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_sec: Option<u64>,
}

/// Validated settings needed to build a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl StoredConfig {
    pub fn required(&self) -> Result<AppConfig, ConfigError> {
        let api_key = non_blank(self.openai_api_key.as_deref());
        let model = non_blank(self.model.as_deref());

        let mut missing = Vec::new();
        if api_key.is_none() {
            missing.push("openai_api_key");
        }
        if model.is_none() {
            missing.push("model");
        }
        let (Some(api_key), Some(model)) = (api_key, model) else {
            return Err(ConfigError::MissingKeys(missing));
        };

        let timeout = match self.timeout_sec {
            Some(0) => {
                return Err(ConfigError::InvalidValue(
                    "timeout_sec must be greater than zero".to_string(),
                ))
            }
            Some(seconds) => Duration::from_secs(seconds),
            None => DEFAULT_TIMEOUT,
        };

        Ok(AppConfig {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: non_blank(self.base_url.as_deref()).map(str::to_string),
            timeout,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file exists and is non-empty.
    pub fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .map(|metadata| metadata.is_file() && metadata.len() > 0)
            .unwrap_or(false)
    }

    /// Loads the document. A missing or blank file loads as empty.
    pub fn load(&self) -> Result<StoredConfig, ConfigError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Ok(StoredConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(StoredConfig::default());
        }

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the file atomically, creating its directory if needed.
    pub fn save(&self, config: &StoredConfig) -> Result<(), ConfigError> {
        let write_error = |source: io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(write_error)?;

        let mut encoded =
            serde_json::to_vec_pretty(config).map_err(|error| write_error(io::Error::other(error)))?;
        encoded.push(b'\n');

        let mut staged = NamedTempFile::new_in(parent).map_err(write_error)?;
        staged.write_all(&encoded).map_err(write_error)?;
        staged
            .persist(&self.path)
            .map_err(|error| write_error(error.error))?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }
}

/// Shows the first and last four characters of a key, or hides short keys entirely.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "<key hidden>".to_string()
    }
}

pub fn is_known_model(model: &str) -> bool {
    MODEL_CHOICES.contains(&model)
}
