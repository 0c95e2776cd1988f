//! # Unit Serialization
//!
//! Encodes a unit's metadata snapshot into the opaque payload carried by a work unit, and
//! decodes it back on the consuming side. The decoded descriptor has the same shape
//! (table or partition) it was encoded from.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::{UnitDescriptor, UnitOfWork};

pub trait UnitSerializer: Send + Sync {
    fn serialize(&self, unit: &UnitDescriptor) -> DiscoveryResult<String>;

    fn deserialize(&self, payload: &str) -> DiscoveryResult<UnitDescriptor>;

    /// Decode the unit carried by a work unit
    fn unit_of(&self, work_unit: &UnitOfWork) -> DiscoveryResult<UnitDescriptor> {
        self.deserialize(work_unit.serialized_unit())
    }
}

/// JSON payloads via serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonUnitSerializer;

impl UnitSerializer for JsonUnitSerializer {
    fn serialize(&self, unit: &UnitDescriptor) -> DiscoveryResult<String> {
        serde_json::to_string(unit)
            .map_err(|e| DiscoveryError::serialization(unit.complete_name(), e.to_string()))
    }

    fn deserialize(&self, payload: &str) -> DiscoveryResult<UnitDescriptor> {
        serde_json::from_str(payload)
            .map_err(|e| DiscoveryError::serialization("<payload>", e.to_string()))
    }
}
