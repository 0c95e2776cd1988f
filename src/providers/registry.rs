//! # Update Provider Registry
//!
//! Maps configuration keys to provider constructors. The configured key is resolved once
//! at run start; an unknown key is a configuration error raised before any catalog traffic.
//!
//! ## Usage
//!
//! ```rust
//! use watermark_discovery::config::UpdateProviderConfig;
//! use watermark_discovery::providers::UpdateProviderRegistry;
//!
//! let registry = UpdateProviderRegistry::with_defaults();
//! let provider = registry.resolve(&UpdateProviderConfig::default()).unwrap();
//! assert_eq!(provider.name(), "filesystem");
//! ```

use super::{FilesystemUpdateTimeProvider, MetastoreUpdateTimeProvider, UpdateTimeProvider};
use crate::config::{ConfigurationError, UpdateProviderConfig};
use crate::constants::update_providers;
use crate::error::DiscoveryResult;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub type UpdateProviderConstructor = Arc<
    dyn Fn(&UpdateProviderConfig) -> DiscoveryResult<Arc<dyn UpdateTimeProvider>> + Send + Sync,
>;

#[derive(Clone, Default)]
pub struct UpdateProviderRegistry {
    constructors: HashMap<String, UpdateProviderConstructor>,
}

impl UpdateProviderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in filesystem and metastore providers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(update_providers::FILESYSTEM, |config: &UpdateProviderConfig| {
            let provider = match &config.location_root {
                Some(root) => FilesystemUpdateTimeProvider::with_location_root(root),
                None => FilesystemUpdateTimeProvider::new(),
            };
            Ok(Arc::new(provider) as Arc<dyn UpdateTimeProvider>)
        });
        registry.register(update_providers::METASTORE, |_: &UpdateProviderConfig| {
            Ok(Arc::new(MetastoreUpdateTimeProvider) as Arc<dyn UpdateTimeProvider>)
        });
        registry
    }

    /// Register a constructor under `key`, replacing any previous one
    pub fn register<F>(&mut self, key: &str, constructor: F)
    where
        F: Fn(&UpdateProviderConfig) -> DiscoveryResult<Arc<dyn UpdateTimeProvider>>
            + Send
            + Sync
            + 'static,
    {
        if self.constructors.contains_key(key) {
            warn!(key = key, "Update provider already registered, replacing");
        }
        self.constructors.insert(key.to_string(), Arc::new(constructor));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn available_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.constructors.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Construct the provider named by `config.kind`
    pub fn resolve(&self, config: &UpdateProviderConfig) -> DiscoveryResult<Arc<dyn UpdateTimeProvider>> {
        let constructor = self.constructors.get(&config.kind).ok_or_else(|| {
            ConfigurationError::unknown_update_provider(&config.kind, self.available_keys())
        })?;

        let provider = constructor(config)?;
        info!(key = %config.kind, provider = provider.name(), "Resolved update provider");
        Ok(provider)
    }
}

impl std::fmt::Debug for UpdateProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateProviderRegistry")
            .field("keys", &self.available_keys())
            .finish()
    }
}
