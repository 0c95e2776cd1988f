//! # Discovery Source
//!
//! Wires configuration, the update provider registry and a watermark store into a
//! [`WorkUnitAssembler`], and reports run-level events around each walk.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use watermark_discovery::catalog::InMemoryCatalog;
//! use watermark_discovery::config::DiscoveryConfig;
//! use watermark_discovery::discovery::DiscoverySource;
//! use watermark_discovery::providers::UpdateProviderRegistry;
//! use watermark_discovery::watermark::TableLevelWatermarker;
//!
//! # tokio_test::block_on(async {
//! let source = DiscoverySource::from_config(
//!     &DiscoveryConfig::default(),
//!     &UpdateProviderRegistry::with_defaults(),
//!     Arc::new(TableLevelWatermarker::default()),
//! )
//! .unwrap();
//!
//! let run = source.get_work_units(&InMemoryCatalog::new()).await.unwrap();
//! assert!(run.work_units.is_empty());
//! # });
//! ```

use super::{ChangeDetector, WorkUnitAssembler};
use crate::catalog::DatasetCatalog;
use crate::clock::Clock;
use crate::config::DiscoveryConfig;
use crate::constants::events;
use crate::error::DiscoveryResult;
use crate::events::{EventPublisher, RunContext, RunReport};
use crate::logging;
use crate::models::UnitOfWork;
use crate::providers::UpdateProviderRegistry;
use crate::watermark::WatermarkStore;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Result of a successful discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryRun {
    pub run_id: Uuid,
    pub work_units: Vec<UnitOfWork>,
    pub report: RunReport,
}

#[derive(Debug)]
pub struct DiscoverySource {
    assembler: WorkUnitAssembler,
    publisher: Option<EventPublisher>,
    event_prefix: String,
}

impl DiscoverySource {
    /// Resolve collaborators named by `config`
    ///
    /// Fails with a configuration error, before any catalog access, when the update provider
    /// key is not registered.
    pub fn from_config(
        config: &DiscoveryConfig,
        registry: &UpdateProviderRegistry,
        watermark_store: Arc<dyn WatermarkStore>,
    ) -> DiscoveryResult<Self> {
        config.validate()?;
        let update_provider = registry.resolve(&config.update_provider)?;

        let assembler = WorkUnitAssembler::new(ChangeDetector::new(update_provider), watermark_store)
            .with_lookup_concurrency(config.discovery.lookup_concurrency);
        let publisher = config
            .events
            .enabled
            .then(|| EventPublisher::new(config.events.channel_capacity));

        Ok(Self {
            assembler,
            publisher,
            event_prefix: config.events.prefix.clone(),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.assembler = self.assembler.with_clock(clock);
        self
    }

    /// Publisher for run events, `None` when events are disabled
    pub fn event_publisher(&self) -> Option<&EventPublisher> {
        self.publisher.as_ref()
    }

    pub fn assembler(&self) -> &WorkUnitAssembler {
        &self.assembler
    }

    /// Walk `catalog` once and return every work unit, or the error that stopped the walk
    #[instrument(skip_all)]
    pub async fn get_work_units(&self, catalog: &dyn DatasetCatalog) -> DiscoveryResult<DiscoveryRun> {
        let context = RunContext::new(self.publisher.clone(), self.event_prefix.clone());
        let run_id = context.run_id();

        context.emit(events::SETUP, &json!({}))?;
        context.emit(events::FIND_DATASETS, &json!({}))?;

        match self.assembler.run(catalog, &context).await {
            Ok(work_units) => {
                let report = context.report();
                context.emit(
                    events::RUN_COMPLETED,
                    &json!({
                        "datasets_visited": report.datasets_visited,
                        "units_evaluated": report.units_evaluated,
                        "work_units_emitted": report.work_units_emitted,
                        "units_skipped": report.skipped.len(),
                    }),
                )?;

                info!(
                    run_id = %run_id,
                    work_units = work_units.len(),
                    skipped = report.skipped.len(),
                    "Discovery run completed"
                );

                Ok(DiscoveryRun {
                    run_id,
                    work_units,
                    report: context.into_report(),
                })
            }
            Err(error) => {
                logging::log_error(
                    "DiscoverySource",
                    "get_work_units",
                    &error.to_string(),
                    Some(&run_id.to_string()),
                );
                // best effort, the walk error is returned either way
                let _ = context.emit(
                    events::RUN_FAILED,
                    &json!({
                        "category": error.category(),
                        "error": error.to_string(),
                    }),
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationError;
    use crate::error::DiscoveryError;
    use crate::watermark::TableLevelWatermarker;

    #[test]
    fn test_unknown_provider_fails_before_run() {
        let mut config = DiscoveryConfig::default();
        config.update_provider.kind = "reflection".to_string();

        let result = DiscoverySource::from_config(
            &config,
            &UpdateProviderRegistry::with_defaults(),
            Arc::new(TableLevelWatermarker::default()),
        );

        assert!(matches!(
            result,
            Err(DiscoveryError::Configuration(
                ConfigurationError::UnknownUpdateProvider { .. }
            ))
        ));
    }

    #[test]
    fn test_disabled_events_have_no_publisher() {
        let mut config = DiscoveryConfig::default();
        config.events.enabled = false;
        config.discovery.lookup_concurrency = 8;

        let source = DiscoverySource::from_config(
            &config,
            &UpdateProviderRegistry::with_defaults(),
            Arc::new(TableLevelWatermarker::default()),
        )
        .unwrap();

        assert!(source.event_publisher().is_none());
        assert_eq!(source.assembler().lookup_concurrency(), 8);
    }
}
