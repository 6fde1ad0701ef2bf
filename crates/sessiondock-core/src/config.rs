//! Launcher configuration.
//!
//! Read from `~/.config/sessiondock/config.json`. Every field is optional;
//! a missing file means all defaults.
//!
//! ```json
//! {
//!   "serverUrl": "http://127.0.0.1:8080",
//!   "password": "hunter2",
//!   "fallbackUrl": "https://www.google.com/",
//!   "timeoutSecs": 30
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths;
use crate::remote::HttpConfig;
use crate::session::{StoreKeys, DEFAULT_DEFAULT_KEY, DEFAULT_SESSIONS_KEY};
use crate::workflow::DEFAULT_FALLBACK_URL;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Location(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LauncherConfig {
    /// Root URL of the remote session service.
    pub server_url: String,
    /// Password for the remote service, if it asks for one.
    pub password: Option<String>,
    /// Destination used when a launch has no URL.
    pub fallback_url: String,
    pub sessions_key: String,
    pub default_key: String,
    /// Where the session cache lives. Defaults to `store.json` next to the config.
    pub store_path: Option<PathBuf>,
    /// When set, remote requests are traced to `remote.log` in this directory.
    pub request_log_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            password: None,
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            sessions_key: DEFAULT_SESSIONS_KEY.to_string(),
            default_key: DEFAULT_DEFAULT_KEY.to_string(),
            store_path: None,
            request_log_dir: None,
            timeout_secs: 30,
        }
    }
}

impl LauncherConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the standard location under the home directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file().map_err(ConfigError::Location)?;
        Self::load(&path)
    }

    pub fn store_keys(&self) -> StoreKeys {
        StoreKeys {
            sessions: self.sessions_key.clone(),
            default_session: self.default_key.clone(),
        }
    }

    /// The configured store path, or the default one.
    pub fn resolved_store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => paths::default_store_file().map_err(ConfigError::Location),
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.server_url.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            request_log_dir: self.request_log_dir.clone(),
        }
    }
}
