//! Configuration Loader
//!
//! Environment-aware configuration loading. Finds `discovery-config.yaml`, applies the
//! section named after the active environment over the base values, then validates.

use super::error::{ConfigResult, ConfigurationError};
use super::DiscoveryConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const CONFIG_FILE_NAMES: [&str; 2] = ["discovery-config.yaml", "discovery-config.yml"];
const ENVIRONMENTS: [&str; 3] = ["development", "test", "production"];

pub struct ConfigManager {
    config: DiscoveryConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        debug!(
            environment = environment,
            update_provider = %config.update_provider.kind,
            watermark_store = %config.watermark.store,
            lookup_concurrency = config.discovery.lookup_concurrency,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Build a manager around an already constructed configuration
    pub fn from_config(config: DiscoveryConfig, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: PathBuf::from("config"),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect current environment: DISCOVERY_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("DISCOVERY_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.is_file() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::NotFound { searched_paths })
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<DiscoveryConfig> {
        let config_file = Self::find_config_file(config_directory)?;
        let yaml_content =
            std::fs::read_to_string(&config_file).map_err(|source| ConfigurationError::Unreadable {
                path: config_file.clone(),
                source,
            })?;

        Self::parse_with_environment(&yaml_content, environment).map_err(|source| {
            ConfigurationError::InvalidYaml {
                path: config_file,
                source,
            }
        })
    }

    /// Parse YAML text and apply the overrides for `environment`
    pub fn parse_with_environment(
        yaml_content: &str,
        environment: &str,
    ) -> Result<DiscoveryConfig, serde_yaml::Error> {
        let mut yaml_data: YamlValue = serde_yaml::from_str(yaml_content)?;

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!(
                "Applying environment-specific overrides for: {}",
                environment
            );
            Self::merge_yaml_values(&mut yaml_data, env_overrides);
        }

        // Environment sections are not part of the config struct
        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for name in ENVIRONMENTS {
                map.remove(YamlValue::String(name.to_string()));
            }
            map.remove(YamlValue::String(environment.to_string()));
        }

        if yaml_data.is_null() {
            return Ok(DiscoveryConfig::default());
        }

        serde_yaml::from_value(yaml_data)
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value);
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
    }
}
