//! # Discovery Configuration
//!
//! YAML-backed configuration for a discovery run: which update-time provider to resolve,
//! which watermark store to use, how much lookup concurrency to allow and how run events
//! are published.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use watermark_discovery::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let kind = &manager.config().update_provider.kind;
//! let concurrency = manager.config().discovery.lookup_concurrency;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{update_providers, watermark_stores};
use serde::{Deserialize, Serialize};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring discovery-config.yaml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Which update-time provider to resolve from the registry
    pub update_provider: UpdateProviderConfig,

    /// Where previous high watermarks come from
    pub watermark: WatermarkConfig,

    /// Catalog walk settings
    pub discovery: WalkConfig,

    /// Run event publishing
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateProviderConfig {
    /// Registry key of the provider constructor
    pub kind: String,
    /// Prefix joined to relative unit locations by the filesystem provider
    pub location_root: Option<String>,
}

impl Default for UpdateProviderConfig {
    fn default() -> Self {
        Self {
            kind: update_providers::DEFAULT.to_string(),
            location_root: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub store: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            store: watermark_stores::TABLE_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Number of per-unit lookups in flight within a dataset; 1 keeps the walk sequential
    pub lookup_concurrency: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            lookup_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    pub enabled: bool,
    pub channel_capacity: usize,
    pub prefix: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_capacity: 1000,
            prefix: "discovery".to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Validate value ranges and enumerated fields
    ///
    /// The update provider key is not checked here; it is validated when it is resolved
    /// against a registry, which may carry custom providers.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.update_provider.kind.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "update_provider.kind",
                &self.update_provider.kind,
                "must name a registered update provider",
            ));
        }

        if self.discovery.lookup_concurrency == 0 {
            return Err(ConfigurationError::invalid_value(
                "discovery.lookup_concurrency",
                "0",
                "must be at least 1",
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0",
                "must be at least 1",
            ));
        }

        if !watermark_stores::ALL.contains(&self.watermark.store.as_str()) {
            return Err(ConfigurationError::invalid_value(
                "watermark.store",
                &self.watermark.store,
                format!("expected one of {:?}", watermark_stores::ALL),
            ));
        }

        Ok(())
    }

    /// True when per-unit lookups may be fanned out
    pub fn is_concurrent(&self) -> bool {
        self.discovery.lookup_concurrency > 1
    }
}
