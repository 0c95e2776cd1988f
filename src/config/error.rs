//! Configuration Error Types
//!
//! Raised while locating and parsing `discovery-config.yaml`, and while resolving the
//! collaborators it names.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// None of the candidate file names exist in the configuration directory
    #[error("no discovery configuration found, tried {searched_paths:?}")]
    NotFound { searched_paths: Vec<PathBuf> },

    #[error("cannot read {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid discovery configuration", path.display())]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{field} = '{value}' rejected: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// No update-time provider is registered under the configured key
    #[error("unknown update provider '{key}', registered: {available:?}")]
    UnknownUpdateProvider { key: String, available: Vec<String> },
}

impl ConfigurationError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_update_provider(key: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownUpdateProvider {
            key: key.into(),
            available,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
