use super::UpdateTimeProvider;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::UnitDescriptor;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Reads the modification time of the unit's storage location
#[derive(Debug, Clone, Default)]
pub struct FilesystemUpdateTimeProvider {
    location_root: Option<PathBuf>,
}

impl FilesystemUpdateTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative unit locations against `root`
    pub fn with_location_root(root: impl Into<PathBuf>) -> Self {
        Self {
            location_root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.location_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl UpdateTimeProvider for FilesystemUpdateTimeProvider {
    async fn get_update_time(&self, unit: &UnitDescriptor) -> DiscoveryResult<i64> {
        let location = unit.location.as_deref().ok_or_else(|| {
            DiscoveryError::update_provider(unit.complete_name(), "unit has no storage location")
        })?;
        let path = self.resolve(location);

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            DiscoveryError::update_provider(
                unit.complete_name(),
                format!("failed to stat {}: {e}", path.display()),
            )
        })?;

        let modified = metadata
            .modified()
            .map_err(|e| DiscoveryError::update_provider(unit.complete_name(), e.to_string()))?;
        let millis = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DiscoveryError::update_provider(unit.complete_name(), e.to_string()))?
            .as_millis();

        debug!(unit = %unit, path = %path.display(), update_time = %millis, "Read location modification time");

        i64::try_from(millis).map_err(|_| {
            DiscoveryError::update_provider(unit.complete_name(), "modification time out of range")
        })
    }

    fn name(&self) -> &str {
        crate::constants::update_providers::FILESYSTEM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_directory_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let unit = UnitDescriptor::table("db", "events")
            .with_location(temp_dir.path().display().to_string());

        let update_time = FilesystemUpdateTimeProvider::new()
            .get_update_time(&unit)
            .await
            .unwrap();
        assert!(update_time > 0);
    }

    #[tokio::test]
    async fn test_relative_location_uses_root() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("events")).unwrap();
        let unit = UnitDescriptor::table("db", "events").with_location("events");

        let provider = FilesystemUpdateTimeProvider::with_location_root(temp_dir.path());
        assert!(provider.get_update_time(&unit).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_location_is_a_provider_failure() {
        let provider = FilesystemUpdateTimeProvider::new();

        let no_location = UnitDescriptor::table("db", "events");
        let err = provider.get_update_time(&no_location).await.unwrap_err();
        assert!(err.is_provider_failure());

        let missing = UnitDescriptor::table("db", "events").with_location("/definitely/not/here");
        let err = provider.get_update_time(&missing).await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here"));
    }
}
