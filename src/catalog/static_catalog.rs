use super::{Dataset, DatasetCatalog};
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::UnitDescriptor;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum CatalogEntry {
    Dataset(Dataset),
    /// Enumeration itself fails when the walk reaches this position
    Failure { dataset: String, message: String },
}

/// Catalog held in memory, yielding datasets in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Vec<CatalogEntry>,
    partitions: HashMap<String, Result<Vec<UnitDescriptor>, String>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unpartitioned table
    pub fn with_table(mut self, table: UnitDescriptor) -> Self {
        self.entries.push(CatalogEntry::Dataset(Dataset::new(table)));
        self
    }

    /// Add a partitioned table and its partitions
    pub fn with_partitioned_table(
        mut self,
        table: UnitDescriptor,
        partitions: Vec<UnitDescriptor>,
    ) -> Self {
        self.partitions
            .insert(table.table_complete_name(), Ok(partitions));
        self.entries.push(CatalogEntry::Dataset(Dataset::new(table)));
        self
    }

    /// Add a partitioned table whose partition listing fails
    pub fn with_failing_listing(mut self, table: UnitDescriptor, message: impl Into<String>) -> Self {
        self.partitions
            .insert(table.table_complete_name(), Err(message.into()));
        self.entries.push(CatalogEntry::Dataset(Dataset::new(table)));
        self
    }

    /// Make enumeration fail at this position
    pub fn with_enumeration_failure(
        mut self,
        dataset: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.entries.push(CatalogEntry::Failure {
            dataset: dataset.into(),
            message: message.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DatasetCatalog for InMemoryCatalog {
    fn datasets(&self) -> BoxStream<'_, DiscoveryResult<Dataset>> {
        stream::iter(self.entries.iter().map(|entry| match entry {
            CatalogEntry::Dataset(dataset) => Ok(dataset.clone()),
            CatalogEntry::Failure { dataset, message } => {
                Err(DiscoveryError::catalog(dataset.clone(), message.clone()))
            }
        }))
        .boxed()
    }

    async fn list_units(&self, dataset: &Dataset) -> DiscoveryResult<Vec<UnitDescriptor>> {
        match self.partitions.get(&dataset.name()) {
            Some(Ok(partitions)) => Ok(partitions.clone()),
            Some(Err(message)) => Err(DiscoveryError::catalog(dataset.name(), message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldSchema;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_datasets_in_insertion_order() {
        let sales = UnitDescriptor::table("db", "sales")
            .with_partition_key(FieldSchema::new("dt", "string"));
        let partitions = vec![sales.partition(["a"]), sales.partition(["b"])];
        let catalog = InMemoryCatalog::new()
            .with_table(UnitDescriptor::table("db", "orders"))
            .with_partitioned_table(sales, partitions);

        let datasets: Vec<Dataset> = catalog.datasets().try_collect().await.unwrap();
        let names: Vec<String> = datasets.iter().map(Dataset::name).collect();
        assert_eq!(names, vec!["db@orders", "db@sales"]);
        assert!(!datasets[0].is_partitioned());
        assert!(datasets[1].is_partitioned());

        let units = catalog.list_units(&datasets[1]).await.unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].complete_name(), "db@sales@dt=b");
    }

    #[tokio::test]
    async fn test_failures_surface_as_catalog_errors() {
        let table = UnitDescriptor::table("db", "broken")
            .with_partition_key(FieldSchema::new("dt", "string"));
        let catalog = InMemoryCatalog::new()
            .with_failing_listing(table.clone(), "metastore unreachable")
            .with_enumeration_failure("db@next", "listing timed out");

        let mut stream = catalog.datasets();
        let first = stream.next().await.unwrap().unwrap();
        let err = catalog.list_units(&first).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Catalog { .. }));

        let second = stream.next().await.unwrap();
        assert!(matches!(second, Err(DiscoveryError::Catalog { .. })));
        assert!(stream.next().await.is_none());
    }
}
