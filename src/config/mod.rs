//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum number of suspended call sessions held in memory
    pub max_sessions: u64,
    /// Seconds of caller inactivity before a session is dropped
    pub session_idle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            session_idle_secs: 600,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from `SWITCHBOARD_CONFIG`, falling back to
    /// `switchboard.toml` in the working directory, then to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("SWITCHBOARD_CONFIG") {
            return Self::from_file(path);
        }

        let default_path = Path::new("switchboard.toml");
        if default_path.exists() {
            return Self::from_file(default_path);
        }

        Ok(Self::default())
    }
}
