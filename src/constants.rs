//! # Discovery Constants
//!
//! Property keys carried by emitted work units, event names published during a run,
//! and the registry keys of the built-in update-time providers.

/// Keys of the property bag attached to every [`UnitOfWork`](crate::models::UnitOfWork)
pub mod work_unit_keys {
    /// Serialized metadata snapshot of the table or partition
    pub const UNIT_SERIALIZED: &str = "unit.serialized";
    /// `db@table@k=v/...` name of the partition
    pub const PARTITIONS_COMPLETE_NAME: &str = "unit.partitions.completeName";
    /// `k=v/...` name of the partition
    pub const PARTITIONS_NAME: &str = "unit.partitions.name";
    /// Colon separated partition column types
    pub const PARTITIONS_TYPE: &str = "unit.partitions.type";
    /// Complete name of the owning table
    pub const DATASET_URN: &str = "dataset.urn";
}

/// Run-level events, published under the configured prefix
pub mod events {
    pub const SETUP: &str = "setup";
    pub const FIND_DATASETS: &str = "find_datasets";
    pub const WORK_UNIT_CREATED: &str = "work_unit_created";
    pub const UNIT_SKIPPED: &str = "unit_skipped";
    pub const RUN_COMPLETED: &str = "run_completed";
    pub const RUN_FAILED: &str = "run_failed";

    /// Join an event name with its prefix (`discovery.setup`)
    pub fn qualified(prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }
}

/// Registry keys of the built-in update-time providers
pub mod update_providers {
    pub const FILESYSTEM: &str = "filesystem";
    pub const METASTORE: &str = "metastore";
    pub const DEFAULT: &str = FILESYSTEM;
}

/// Names of the supported watermark stores
pub mod watermark_stores {
    pub const TABLE_LEVEL: &str = "table_level";
    pub const IN_MEMORY: &str = "in_memory";
    pub const ALL: [&str; 2] = [TABLE_LEVEL, IN_MEMORY];
}

/// Metastore parameter holding the last DDL time, in seconds since epoch
pub const LAST_DDL_TIME_PARAMETER: &str = "transient_lastDdlTime";

/// Separator between the database, table and partition parts of a complete name
pub const COMPLETE_NAME_SEPARATOR: char = '@';
