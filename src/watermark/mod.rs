//! # Watermark Stores
//!
//! A watermark store answers "how far did the previous successful run get for this unit".
//! Stores are read-only during a run; persisting a new high watermark is the downstream
//! consumer's job once it has processed the work unit.

pub mod in_memory;
pub mod table_level;

use crate::config::{ConfigurationError, WatermarkConfig};
use crate::constants::watermark_stores;
use crate::error::DiscoveryResult;
use crate::models::{UnitDescriptor, Watermark};
use async_trait::async_trait;
use std::sync::Arc;

pub use in_memory::InMemoryWatermarkStore;
pub use table_level::{PreviousWorkUnitState, TableLevelWatermarker};

#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Previous high watermark for `unit`, or [`Watermark::ZERO`] when none was recorded
    async fn get_previous_high_watermark(&self, unit: &UnitDescriptor) -> DiscoveryResult<Watermark>;
}

/// Build the configured store from the previous run's committed states
pub fn store_from_config<I>(
    config: &WatermarkConfig,
    previous_states: I,
) -> DiscoveryResult<Arc<dyn WatermarkStore>>
where
    I: IntoIterator<Item = PreviousWorkUnitState>,
{
    match config.store.as_str() {
        watermark_stores::TABLE_LEVEL => Ok(Arc::new(TableLevelWatermarker::new(previous_states))),
        watermark_stores::IN_MEMORY => Ok(Arc::new(InMemoryWatermarkStore::from_previous_states(
            previous_states,
        ))),
        other => Err(ConfigurationError::invalid_value(
            "watermark.store",
            other,
            format!("expected one of {:?}", watermark_stores::ALL),
        )
        .into()),
    }
}
