//! YAML configuration document for the dockhook daemon.
//!
//! Every field carries a serde default so a partial document is valid; with
//! no `--config` flag the embedded defaults are used unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{DockhookError, Result};

/// Connection settings for the container runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Runtime endpoint: `unix:///path/to.sock` or `tcp://host:port`.
    pub endpoint: String,
    /// Runtime API version; `None` selects the daemon's default.
    pub version: Option<String>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            endpoint: constants::DEFAULT_DOCKER_ENDPOINT.to_owned(),
            version: None,
        }
    }
}

/// Root configuration for the dockhook daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered plugin executable paths launched at startup.
    pub plugins: Vec<String>,
    /// Container runtime connection settings.
    pub docker: DockerConfig,
    /// Per-plugin-call deadline in seconds.
    pub call_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins: vec![constants::DEFAULT_PLUGIN.to_owned()],
            docker: DockerConfig::default(),
            call_timeout_secs: constants::DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or the embedded defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    /// Both are unrecoverable at startup.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| DockhookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|e| DockhookError::Config {
            message: format!("{}: {e}", path.display()),
        })
    }
}
