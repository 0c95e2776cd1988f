use super::UpdateTimeProvider;
use crate::constants::LAST_DDL_TIME_PARAMETER;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::UnitDescriptor;
use async_trait::async_trait;

/// Uses the last DDL time recorded in the unit's metastore parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct MetastoreUpdateTimeProvider;

#[async_trait]
impl UpdateTimeProvider for MetastoreUpdateTimeProvider {
    async fn get_update_time(&self, unit: &UnitDescriptor) -> DiscoveryResult<i64> {
        let raw = unit.parameters.get(LAST_DDL_TIME_PARAMETER).ok_or_else(|| {
            DiscoveryError::update_provider(
                unit.complete_name(),
                format!("missing parameter {LAST_DDL_TIME_PARAMETER}"),
            )
        })?;

        let seconds: i64 = raw.trim().parse().map_err(|_| {
            DiscoveryError::update_provider(
                unit.complete_name(),
                format!("invalid {LAST_DDL_TIME_PARAMETER} value '{raw}'"),
            )
        })?;

        seconds.checked_mul(1000).ok_or_else(|| {
            DiscoveryError::update_provider(unit.complete_name(), "update time out of range")
        })
    }

    fn name(&self) -> &str {
        crate::constants::update_providers::METASTORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seconds_converted_to_millis() {
        let unit = UnitDescriptor::table("db", "t").with_parameter(LAST_DDL_TIME_PARAMETER, "1700000000");
        let update_time = MetastoreUpdateTimeProvider.get_update_time(&unit).await.unwrap();
        assert_eq!(update_time, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_missing_or_invalid_parameter() {
        let missing = UnitDescriptor::table("db", "t");
        assert!(MetastoreUpdateTimeProvider
            .get_update_time(&missing)
            .await
            .unwrap_err()
            .is_provider_failure());

        let invalid = UnitDescriptor::table("db", "t").with_parameter(LAST_DDL_TIME_PARAMETER, "yesterday");
        let err = MetastoreUpdateTimeProvider.get_update_time(&invalid).await.unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}
