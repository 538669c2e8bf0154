// src/core/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dtype::DataType;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "ndxform.toml";
/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "NDXFORM_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// How an explicit output shape is checked against the primary input shape when the
/// operation is not in-place. In-place operations always require exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapePolicy {
    /// Explicit shape must equal the input shape.
    Exact,
    /// Input shape must broadcast to the explicit shape.
    #[default]
    Broadcast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub shape_policy: ShapePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Element type used by front ends when the caller does not name one.
    #[serde(default = "default_dtype")]
    pub default_dtype: DataType,
}

fn default_dtype() -> DataType {
    DataType::Float
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_dtype: default_dtype(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl EngineConfig {
    /// Loads `$NDXFORM_CONFIG` or `./ndxform.toml`. A missing file yields the defaults;
    /// an unreadable or invalid one is logged and also yields the defaults.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if !path.exists() {
            log::debug!("no configuration at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_path(&path) {
            Ok(config) => {
                log::debug!("loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "ignoring configuration at {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
