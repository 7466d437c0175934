//! # Herald Core Configuration
//!
//! [`EventConfig`] holds the knobs of the event system: the priority given
//! to listeners registered without one, and whether the dispatcher emits a
//! trace record per listener invocation. It can be read from JSON, YAML
//! (`yaml-config` feature) or TOML (`toml-config` feature).
pub mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::event::{DEFAULT_PRIORITY, Priority};
pub use error::{ConfigError, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Event system settings. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Priority for listeners registered without one
    pub default_priority: Priority,
    /// Log every listener invocation at trace level
    pub trace_dispatch: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            trace_dispatch: false,
        }
    }
}

impl EventConfig {
    /// Parse configuration text in the given format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let deserialize_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::DeserializationError {
                format: format.extension().to_string(),
                source,
            }
        };
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(data).map_err(|e| deserialize_error(e.into()))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(data).map_err(|e| deserialize_error(e.into()))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::from_str(data).map_err(|e| deserialize_error(e.into()))
            }
        }
    }

    /// Render the configuration in the given format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let serialize_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::SerializationError {
                format: format.extension().to_string(),
                source,
            }
        };
        match format {
            ConfigFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| serialize_error(e.into()))
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| serialize_error(e.into()))
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| serialize_error(e.into()))
            }
        }
    }

    /// Load configuration from a file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            ConfigError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::deserialize(&data, format)?;
        log::debug!("Loaded event configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
