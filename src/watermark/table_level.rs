use super::WatermarkStore;
use crate::error::DiscoveryResult;
use crate::models::{UnitDescriptor, UnitOfWork, Watermark};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// What a previous run committed for one work unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousWorkUnitState {
    pub dataset_urn: String,
    /// Complete name of the table or partition the work unit covered
    pub unit_name: String,
    pub actual_high_watermark: Watermark,
}

impl PreviousWorkUnitState {
    /// State of a table-shaped work unit
    pub fn new(dataset_urn: impl Into<String>, actual_high_watermark: Watermark) -> Self {
        let dataset_urn = dataset_urn.into();
        Self {
            unit_name: dataset_urn.clone(),
            dataset_urn,
            actual_high_watermark,
        }
    }

    pub fn for_unit(
        dataset_urn: impl Into<String>,
        unit_name: impl Into<String>,
        actual_high_watermark: Watermark,
    ) -> Self {
        Self {
            dataset_urn: dataset_urn.into(),
            unit_name: unit_name.into(),
            actual_high_watermark,
        }
    }

    /// State committed after `work_unit` was fully processed up to its expected high
    pub fn committed(work_unit: &UnitOfWork) -> Self {
        Self::for_unit(
            work_unit.dataset_urn(),
            work_unit
                .partition_complete_name()
                .unwrap_or_else(|| work_unit.dataset_urn()),
            work_unit.watermark_interval().expected_high(),
        )
    }
}

/// One watermark per table, taken from the previous run's committed states
///
/// Partitions share their table's watermark: a partition is looked up by its parent
/// table's complete name. When several states exist for a table the highest wins.
#[derive(Debug, Clone, Default)]
pub struct TableLevelWatermarker {
    watermarks: HashMap<String, Watermark>,
}

impl TableLevelWatermarker {
    pub fn new<I>(previous_states: I) -> Self
    where
        I: IntoIterator<Item = PreviousWorkUnitState>,
    {
        let mut watermarks: HashMap<String, Watermark> = HashMap::new();
        for state in previous_states {
            watermarks
                .entry(state.dataset_urn)
                .and_modify(|current| *current = (*current).max(state.actual_high_watermark))
                .or_insert(state.actual_high_watermark);
        }

        debug!(tables = watermarks.len(), "Loaded table level watermarks");
        Self { watermarks }
    }

    pub fn len(&self) -> usize {
        self.watermarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watermarks.is_empty()
    }
}

#[async_trait]
impl WatermarkStore for TableLevelWatermarker {
    async fn get_previous_high_watermark(&self, unit: &UnitDescriptor) -> DiscoveryResult<Watermark> {
        Ok(self
            .watermarks
            .get(&unit.table_complete_name())
            .copied()
            .unwrap_or(Watermark::ZERO))
    }
}
