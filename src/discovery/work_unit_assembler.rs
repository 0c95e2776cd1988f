//! # Work Unit Assembler
//!
//! Walks the catalog once and builds a work unit for every stale table or partition.
//!
//! ## Algorithm
//!
//! 1. Capture the expected high watermark once, before the first dataset is pulled.
//! 2. For each dataset in catalog order:
//!    - partitioned: list its partitions and evaluate each one
//!    - unpartitioned: evaluate the table itself
//! 3. Evaluation reads the unit's low watermark, then its update time. A stale unit yields
//!    a work unit carrying `(low, expected_high)`; anything else is skipped with a note.
//!
//! Any error aborts the walk and no work units are returned. Per-unit events and report
//! entries are held until the walk finishes, so a failed run publishes none of them.
//! Per-unit lookups within a
//! dataset may run concurrently (`lookup_concurrency > 1`); results are consumed in
//! partition order, so the output is the same as a sequential walk.

use super::change_detector::{ChangeDecision, ChangeDetector};
use crate::catalog::{Dataset, DatasetCatalog};
use crate::clock::{Clock, SystemClock};
use crate::constants::events;
use crate::error::DiscoveryResult;
use crate::events::{RunContext, SkipReason, SkippedUnit};
use crate::logging;
use crate::models::{UnitDescriptor, UnitOfWork, UnitShape, Watermark, WatermarkInterval};
use crate::serialization::{JsonUnitSerializer, UnitSerializer};
use crate::watermark::WatermarkStore;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of one unit, published once the whole walk has succeeded
#[derive(Debug)]
enum UnitNote {
    Created {
        unit: String,
        dataset_urn: String,
        interval: WatermarkInterval,
    },
    Skipped(SkippedUnit),
}

pub struct WorkUnitAssembler {
    detector: ChangeDetector,
    watermark_store: Arc<dyn WatermarkStore>,
    serializer: Arc<dyn UnitSerializer>,
    clock: Arc<dyn Clock>,
    lookup_concurrency: usize,
}

impl WorkUnitAssembler {
    /// Sequential assembler with JSON payloads and the system clock
    pub fn new(detector: ChangeDetector, watermark_store: Arc<dyn WatermarkStore>) -> Self {
        Self {
            detector,
            watermark_store,
            serializer: Arc::new(JsonUnitSerializer),
            clock: Arc::new(SystemClock),
            lookup_concurrency: 1,
        }
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn UnitSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Allow up to `concurrency` unit lookups in flight within a dataset
    pub fn with_lookup_concurrency(mut self, concurrency: usize) -> Self {
        self.lookup_concurrency = concurrency.max(1);
        self
    }

    pub fn lookup_concurrency(&self) -> usize {
        self.lookup_concurrency
    }

    /// Walk `catalog` and return the work units of every stale unit, in catalog order
    #[instrument(skip_all, fields(run_id = %context.run_id()))]
    pub async fn run(
        &self,
        catalog: &dyn DatasetCatalog,
        context: &RunContext,
    ) -> DiscoveryResult<Vec<UnitOfWork>> {
        let expected_high = Watermark::new(self.clock.now_millis());
        debug!(expected_high = expected_high.value(), "Captured expected high watermark");

        let mut work_units = Vec::new();
        let mut notes = Vec::new();
        let mut datasets = catalog.datasets();

        while let Some(dataset) = datasets.try_next().await? {
            context.record_dataset();
            debug!(dataset = %dataset, partitioned = dataset.is_partitioned(), "Processing dataset");

            if dataset.is_partitioned() {
                let partitions = catalog.list_units(&dataset).await?;
                let decisions = self.evaluate_all(&partitions).await?;

                for (partition, decision) in partitions.iter().zip(decisions) {
                    if let Some(work_unit) = self.assemble(
                        &dataset,
                        partition,
                        decision,
                        expected_high,
                        context,
                        &mut notes,
                    )? {
                        work_units.push(work_unit);
                    }
                }
            } else {
                let decision = self.evaluate(dataset.table()).await?;
                if let Some(work_unit) = self.assemble(
                    &dataset,
                    dataset.table(),
                    decision,
                    expected_high,
                    context,
                    &mut notes,
                )? {
                    work_units.push(work_unit);
                }
            }
        }

        self.publish_notes(context, notes)?;

        info!(
            work_units = work_units.len(),
            expected_high = expected_high.value(),
            "Completed work unit assembly"
        );

        Ok(work_units)
    }

    async fn evaluate(&self, unit: &UnitDescriptor) -> DiscoveryResult<ChangeDecision> {
        let low_watermark = self.watermark_store.get_previous_high_watermark(unit).await?;
        self.detector.evaluate(unit, low_watermark).await
    }

    /// Decisions for `units`, index-aligned with the input
    async fn evaluate_all(&self, units: &[UnitDescriptor]) -> DiscoveryResult<Vec<ChangeDecision>> {
        if self.lookup_concurrency <= 1 {
            let mut decisions = Vec::with_capacity(units.len());
            for unit in units {
                decisions.push(self.evaluate(unit).await?);
            }
            return Ok(decisions);
        }

        stream::iter(units.iter().map(|unit| self.evaluate(unit)))
            .buffered(self.lookup_concurrency)
            .try_collect()
            .await
    }

    fn assemble(
        &self,
        dataset: &Dataset,
        unit: &UnitDescriptor,
        decision: ChangeDecision,
        expected_high: Watermark,
        context: &RunContext,
        notes: &mut Vec<UnitNote>,
    ) -> DiscoveryResult<Option<UnitOfWork>> {
        context.record_evaluated();
        let unit_name = unit.complete_name();

        if !decision.stale {
            logging::log_unit_skipped(&unit_name, decision.update_time, decision.low_watermark.value());
            notes.push(skipped_note(unit_name, decision, SkipReason::NotChanged));
            return Ok(None);
        }

        let Some(interval) = WatermarkInterval::new(decision.low_watermark, expected_high) else {
            warn!(
                unit = %unit_name,
                low_watermark = decision.low_watermark.value(),
                expected_high = expected_high.value(),
                "Low watermark is ahead of the expected high watermark, not creating work unit"
            );
            notes.push(skipped_note(unit_name, decision, SkipReason::LowWatermarkAhead));
            return Ok(None);
        };

        let payload = self.serializer.serialize(unit)?;
        let dataset_urn = dataset.name();
        let work_unit = match unit.shape() {
            UnitShape::Partition => UnitOfWork::for_partition(payload, &dataset_urn, unit, interval),
            UnitShape::Table => UnitOfWork::for_table(payload, &dataset_urn, interval),
        };

        logging::log_work_unit_created(
            &unit_name,
            &dataset_urn,
            interval.low().value(),
            interval.expected_high().value(),
        );
        notes.push(UnitNote::Created {
            unit: unit_name,
            dataset_urn,
            interval,
        });

        Ok(Some(work_unit))
    }

    fn publish_notes(&self, context: &RunContext, notes: Vec<UnitNote>) -> DiscoveryResult<()> {
        for note in notes {
            match note {
                UnitNote::Created {
                    unit,
                    dataset_urn,
                    interval,
                } => {
                    context.record_emitted();
                    context.emit(
                        events::WORK_UNIT_CREATED,
                        &json!({
                            "unit": unit,
                            "dataset_urn": dataset_urn,
                            "low_watermark": interval.low().value(),
                            "expected_high_watermark": interval.expected_high().value(),
                        }),
                    )?;
                }
                UnitNote::Skipped(skipped) => {
                    context.emit(events::UNIT_SKIPPED, &skipped)?;
                    context.record_skipped(skipped);
                }
            }
        }
        Ok(())
    }
}

fn skipped_note(unit: String, decision: ChangeDecision, reason: SkipReason) -> UnitNote {
    UnitNote::Skipped(SkippedUnit {
        unit,
        update_time: decision.update_time,
        low_watermark: decision.low_watermark,
        reason,
    })
}

impl std::fmt::Debug for WorkUnitAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkUnitAssembler")
            .field("detector", &self.detector)
            .field("lookup_concurrency", &self.lookup_concurrency)
            .finish()
    }
}
