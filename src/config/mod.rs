// ABOUTME: Runtime connection configuration for stevedore.yml.
// ABOUTME: Handles YAML parsing, defaults and config file discovery.

mod stop;

pub use stop::StopConfig;

use crate::error::{Error, Result};
use crate::runtime::RuntimeType;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "stevedore.yml";
pub const CONFIG_FILENAME_ALT: &str = "stevedore.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stevedore/config.yml";

/// How to reach the container runtime and how to drive it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Explicit runtime type (overrides auto-detection).
    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    /// Explicit socket path (overrides default).
    #[serde(default)]
    pub socket: Option<String>,

    /// Timeout for individual runtime API requests.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default)]
    pub stop: StopConfig,
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

impl Default for Config {
    fn default() -> Self {
        Config {
            runtime: None,
            socket: None,
            timeout: default_timeout(),
            stop: StopConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading runtime configuration");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but falls back to defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }
}
