//! File configuration for ranker_app.
//!
//! Reads `ranker.ron` (or the `--config` path). A missing file means defaults;
//! CLI flags and environment variables override file values.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ranker_engine::{OrchestratorSettings, ServiceSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const API_URL_ENV: &str = "RANKER_API_URL";
pub const TOKEN_ENV: &str = "RANKER_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("poll interval must be at least one second")]
    PollInterval,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Overrides layered on top of the file, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cli_api_url: Option<String>,
    pub env_api_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

pub fn resolve(
    file: &FileConfig,
    overrides: Overrides,
) -> Result<(ServiceSettings, OrchestratorSettings), ConfigError> {
    let mut service = ServiceSettings::default();
    if let Some(url) = overrides
        .cli_api_url
        .or(overrides.env_api_url)
        .or_else(|| file.api_url.clone())
    {
        service.base_url = url;
    }
    if let Some(secs) = file.connect_timeout_secs {
        service.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        service.request_timeout = Duration::from_secs(secs);
    }

    let mut orchestrator = OrchestratorSettings::default();
    if let Some(secs) = overrides.poll_interval_secs.or(file.poll_interval_secs) {
        if secs == 0 {
            return Err(ConfigError::PollInterval);
        }
        orchestrator.poll_interval = Duration::from_secs(secs);
    }

    Ok((service, orchestrator))
}
