//! Node configuration types.

use bazaar_p2p::DEFAULT_PORT;
use bazaar_types::DEFAULT_TOPIC;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::NodeIdentity;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`NodeConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for a Bazaar node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// P2P listen address.
    pub listen_addr: SocketAddr,
    /// Peers to dial on startup.
    pub bootstrap: Vec<SocketAddr>,
    /// Topic shared by the peers of one auction house.
    pub topic: String,
    /// ed25519 secret key (hex encoded); generated when absent.
    pub secret_key: Option<String>,
    /// Log level.
    pub log_level: String,
    /// Emit JSON logs.
    pub log_json: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            bootstrap: Vec::new(),
            topic: DEFAULT_TOPIC.to_string(),
            secret_key: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl NodeConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads a YAML config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Checks values that deserialization cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("topic must not be empty".into()));
        }
        if let Some(secret) = &self.secret_key {
            NodeIdentity::from_secret_hex(secret)
                .map_err(|e| ConfigError::Invalid(format!("secret_key: {e}")))?;
        }
        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level: {}",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Returns the identity configured by `secret_key`, or a fresh one.
    pub fn identity(&self) -> Result<NodeIdentity, ConfigError> {
        match &self.secret_key {
            Some(secret) => NodeIdentity::from_secret_hex(secret)
                .map_err(|e| ConfigError::Invalid(format!("secret_key: {e}"))),
            None => Ok(NodeIdentity::generate()),
        }
    }
}
