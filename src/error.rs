//! # Discovery Error Types
//!
//! Structured errors for a discovery run. Every variant aborts the run it occurs in;
//! nothing here is recovered locally.

use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The catalog could not enumerate a dataset or its units
    #[error("Catalog error for dataset {dataset}: {message}")]
    Catalog { dataset: String, message: String },

    /// The update-time provider failed for a unit
    #[error("Update provider error for unit {unit}: {message}")]
    UpdateProvider { unit: String, message: String },

    /// The watermark store failed for a unit
    #[error("Watermark store error for unit {unit}: {message}")]
    WatermarkStore { unit: String, message: String },

    /// Collaborators could not be resolved from configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Serialization error for unit {unit}: {message}")]
    Serialization { unit: String, message: String },

    #[error("Event error: {0}")]
    Event(String),
}

impl DiscoveryError {
    /// Create a catalog error
    pub fn catalog(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Catalog {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create an update provider error
    pub fn update_provider(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateProvider {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Create a watermark store error
    pub fn watermark_store(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WatermarkStore {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            unit: unit.into(),
            message: message.into(),
        }
    }

    /// True for failures raised before any unit was processed
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// True for update-time or watermark lookup failures
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::UpdateProvider { .. } | Self::WatermarkStore { .. })
    }

    /// Short machine-readable category, used in run-failed events
    pub fn category(&self) -> &'static str {
        match self {
            Self::Catalog { .. } => "catalog",
            Self::UpdateProvider { .. } | Self::WatermarkStore { .. } => "provider",
            Self::Configuration(_) => "configuration",
            Self::Serialization { .. } => "serialization",
            Self::Event(_) => "event",
        }
    }
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
