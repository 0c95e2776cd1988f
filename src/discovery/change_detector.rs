use crate::error::DiscoveryResult;
use crate::models::{UnitDescriptor, Watermark};
use crate::providers::UpdateTimeProvider;
use std::sync::Arc;
use tracing::trace;

/// Outcome of comparing a unit's update time with its low watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDecision {
    pub update_time: i64,
    pub low_watermark: Watermark,
    pub stale: bool,
}

/// Decides whether a unit changed since its low watermark
///
/// The comparison is strict: an update time equal to the low watermark was already
/// processed, so repeated runs without source changes emit nothing.
#[derive(Clone)]
pub struct ChangeDetector {
    update_provider: Arc<dyn UpdateTimeProvider>,
}

impl ChangeDetector {
    pub fn new(update_provider: Arc<dyn UpdateTimeProvider>) -> Self {
        Self { update_provider }
    }

    /// Fetch the update time of `unit` and compare it with `low_watermark`
    pub async fn evaluate(
        &self,
        unit: &UnitDescriptor,
        low_watermark: Watermark,
    ) -> DiscoveryResult<ChangeDecision> {
        let update_time = self.update_provider.get_update_time(unit).await?;
        let stale = Self::is_newer(update_time, low_watermark);

        trace!(
            unit = %unit,
            update_time = update_time,
            low_watermark = low_watermark.value(),
            stale = stale,
            "Evaluated unit"
        );

        Ok(ChangeDecision {
            update_time,
            low_watermark,
            stale,
        })
    }

    pub async fn is_stale(&self, unit: &UnitDescriptor, low_watermark: Watermark) -> DiscoveryResult<bool> {
        Ok(self.evaluate(unit, low_watermark).await?.stale)
    }

    pub fn is_newer(update_time: i64, low_watermark: Watermark) -> bool {
        update_time > low_watermark.value()
    }
}

impl std::fmt::Debug for ChangeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeDetector")
            .field("update_provider", &self.update_provider.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use async_trait::async_trait;

    struct FixedProvider(DiscoveryResult<i64>);

    #[async_trait]
    impl UpdateTimeProvider for FixedProvider {
        async fn get_update_time(&self, unit: &UnitDescriptor) -> DiscoveryResult<i64> {
            match &self.0 {
                Ok(value) => Ok(*value),
                Err(_) => Err(DiscoveryError::update_provider(unit.complete_name(), "boom")),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn detector(update_time: i64) -> ChangeDetector {
        ChangeDetector::new(Arc::new(FixedProvider(Ok(update_time))))
    }

    #[tokio::test]
    async fn test_equal_update_time_is_not_stale() {
        let unit = UnitDescriptor::table("db", "t");
        assert!(!detector(100).is_stale(&unit, Watermark::new(100)).await.unwrap());
        assert!(detector(101).is_stale(&unit, Watermark::new(100)).await.unwrap());
        assert!(!detector(99).is_stale(&unit, Watermark::new(100)).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_watermark_makes_any_positive_time_stale() {
        let unit = UnitDescriptor::table("db", "t");
        let decision = detector(1).evaluate(&unit, Watermark::ZERO).await.unwrap();
        assert_eq!(
            decision,
            ChangeDecision {
                update_time: 1,
                low_watermark: Watermark::ZERO,
                stale: true
            }
        );
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let unit = UnitDescriptor::table("db", "t");
        let detector = ChangeDetector::new(Arc::new(FixedProvider(Err(DiscoveryError::Event(
            String::new(),
        )))));
        let err = detector.evaluate(&unit, Watermark::ZERO).await.unwrap_err();
        assert!(err.is_provider_failure());
    }
}
