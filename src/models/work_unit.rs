use super::{UnitDescriptor, WatermarkInterval};
use crate::constants::work_unit_keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptor handed to downstream processing for one changed unit
///
/// Built once by the assembler and never mutated afterwards. The property bag carries the
/// serialized unit metadata and identifying keys; the interval bounds the work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOfWork {
    properties: BTreeMap<String, String>,
    watermark_interval: WatermarkInterval,
}

impl UnitOfWork {
    /// Work unit for an unpartitioned table
    pub fn for_table(
        serialized_unit: String,
        dataset_urn: impl Into<String>,
        watermark_interval: WatermarkInterval,
    ) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(work_unit_keys::UNIT_SERIALIZED.to_string(), serialized_unit);
        properties.insert(work_unit_keys::DATASET_URN.to_string(), dataset_urn.into());

        Self {
            properties,
            watermark_interval,
        }
    }

    /// Work unit for one partition, tagged with the partition's identifying properties
    pub fn for_partition(
        serialized_unit: String,
        dataset_urn: impl Into<String>,
        partition: &UnitDescriptor,
        watermark_interval: WatermarkInterval,
    ) -> Self {
        let mut work_unit = Self::for_table(serialized_unit, dataset_urn, watermark_interval);
        work_unit.properties.insert(
            work_unit_keys::PARTITIONS_COMPLETE_NAME.to_string(),
            partition.complete_name(),
        );
        work_unit.properties.insert(
            work_unit_keys::PARTITIONS_NAME.to_string(),
            partition.partition_name().unwrap_or_default(),
        );
        work_unit.properties.insert(
            work_unit_keys::PARTITIONS_TYPE.to_string(),
            partition.partition_column_types(),
        );
        work_unit
    }

    pub fn watermark_interval(&self) -> WatermarkInterval {
        self.watermark_interval
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn serialized_unit(&self) -> &str {
        self.property(work_unit_keys::UNIT_SERIALIZED)
            .unwrap_or_default()
    }

    pub fn dataset_urn(&self) -> &str {
        self.property(work_unit_keys::DATASET_URN).unwrap_or_default()
    }

    pub fn partition_complete_name(&self) -> Option<&str> {
        self.property(work_unit_keys::PARTITIONS_COMPLETE_NAME)
    }

    pub fn partition_name(&self) -> Option<&str> {
        self.property(work_unit_keys::PARTITIONS_NAME)
    }

    pub fn partition_types(&self) -> Option<&str> {
        self.property(work_unit_keys::PARTITIONS_TYPE)
    }

    pub fn is_partition(&self) -> bool {
        self.partition_complete_name().is_some()
    }
}
