use super::{PreviousWorkUnitState, WatermarkStore};
use crate::error::DiscoveryResult;
use crate::models::{UnitDescriptor, UnitOfWork, Watermark};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-unit watermarks keyed by complete name
///
/// Cloning shares the underlying map, so a consumer holding a clone can commit progress
/// that the next run will read.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWatermarkStore {
    watermarks: Arc<DashMap<String, Watermark>>,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a previous run's committed states, keeping the highest per unit
    pub fn from_previous_states<I>(previous_states: I) -> Self
    where
        I: IntoIterator<Item = PreviousWorkUnitState>,
    {
        let store = Self::new();
        for state in previous_states {
            store
                .watermarks
                .entry(state.unit_name)
                .and_modify(|current| *current = (*current).max(state.actual_high_watermark))
                .or_insert(state.actual_high_watermark);
        }
        store
    }

    /// Record `watermark` as the high watermark of the unit named `complete_name`
    pub fn commit(&self, complete_name: impl Into<String>, watermark: Watermark) {
        let complete_name = complete_name.into();
        debug!(unit = %complete_name, watermark = watermark.value(), "Committing watermark");
        self.watermarks.insert(complete_name, watermark);
    }

    /// Commit the expected high of a processed work unit
    pub fn commit_work_unit(&self, work_unit: &UnitOfWork) {
        let name = work_unit
            .partition_complete_name()
            .unwrap_or_else(|| work_unit.dataset_urn());
        self.commit(name, work_unit.watermark_interval().expected_high());
    }

    pub fn get(&self, complete_name: &str) -> Option<Watermark> {
        self.watermarks.get(complete_name).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.watermarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watermarks.is_empty()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn get_previous_high_watermark(&self, unit: &UnitDescriptor) -> DiscoveryResult<Watermark> {
        Ok(self.get(&unit.complete_name()).unwrap_or(Watermark::ZERO))
    }
}
