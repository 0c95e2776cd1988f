//! # Dataset Catalog
//!
//! The catalog yields datasets lazily, in its own order, and lists the partitions of a
//! partitioned dataset on demand. How datasets are located is up to the implementation.

pub mod static_catalog;

use crate::error::DiscoveryResult;
use crate::models::UnitDescriptor;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

pub use static_catalog::InMemoryCatalog;

/// A logical dataset: one table, possibly split into partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    table: UnitDescriptor,
}

impl Dataset {
    pub fn new(table: UnitDescriptor) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &UnitDescriptor {
        &self.table
    }

    /// Partitioned datasets are walked partition by partition
    pub fn is_partitioned(&self) -> bool {
        self.table.has_sub_units()
    }

    pub fn name(&self) -> String {
        self.table.table_complete_name()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    /// Pull-based sequence of datasets; an `Err` item aborts the walk
    fn datasets(&self) -> BoxStream<'_, DiscoveryResult<Dataset>>;

    /// Partitions of a partitioned dataset, in the catalog's order
    async fn list_units(&self, dataset: &Dataset) -> DiscoveryResult<Vec<UnitDescriptor>>;
}
