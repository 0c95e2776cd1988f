use crate::constants::COMPLETE_NAME_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A column of a table or a partition key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            comment: None,
        }
    }
}

/// Whether a unit is a whole table or one partition of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitShape {
    Table,
    Partition,
}

/// Metadata snapshot of a table or of a single partition
///
/// A partition carries its parent table's name, columns and partition keys, plus the
/// values it holds for those keys. A table with partition keys has sub-units and is
/// never evaluated directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    pub database: String,
    pub table: String,
    /// Present only for partitions, aligned with `partition_keys`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_values: Option<Vec<String>>,
    #[serde(default)]
    pub partition_keys: Vec<FieldSchema>,
    #[serde(default)]
    pub columns: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl UnitDescriptor {
    /// Create an unpartitioned table unit
    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            partition_values: None,
            partition_keys: Vec::new(),
            columns: Vec::new(),
            location: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, column: FieldSchema) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_partition_key(mut self, key: FieldSchema) -> Self {
        self.partition_keys.push(key);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Create a partition of this table
    ///
    /// The partition's location defaults to `<table location>/<partition name>`.
    /// Parameters are not inherited from the table.
    pub fn partition<I, S>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        debug_assert_eq!(
            values.len(),
            self.partition_keys.len(),
            "{} takes one value per partition key",
            self.table_complete_name()
        );

        let mut partition = Self {
            database: self.database.clone(),
            table: self.table.clone(),
            partition_values: Some(values),
            partition_keys: self.partition_keys.clone(),
            columns: self.columns.clone(),
            location: None,
            parameters: BTreeMap::new(),
        };
        partition.location = match (&self.location, partition.partition_name()) {
            (Some(base), Some(name)) => Some(format!("{}/{name}", base.trim_end_matches('/'))),
            _ => None,
        };
        partition
    }

    pub fn shape(&self) -> UnitShape {
        if self.partition_values.is_some() {
            UnitShape::Partition
        } else {
            UnitShape::Table
        }
    }

    /// True for a table that is iterated into partitions instead of being a unit itself
    pub fn has_sub_units(&self) -> bool {
        self.shape() == UnitShape::Table && !self.partition_keys.is_empty()
    }

    /// `db@table`
    pub fn table_complete_name(&self) -> String {
        format!("{}{COMPLETE_NAME_SEPARATOR}{}", self.database, self.table)
    }

    /// `db@table` for tables, `db@table@k1=v1/k2=v2` for partitions
    pub fn complete_name(&self) -> String {
        match self.partition_name() {
            Some(name) => format!(
                "{}{COMPLETE_NAME_SEPARATOR}{name}",
                self.table_complete_name()
            ),
            None => self.table_complete_name(),
        }
    }

    /// `k1=v1/k2=v2`, or `None` for tables
    pub fn partition_name(&self) -> Option<String> {
        self.partition_values.as_ref().map(|values| {
            self.partition_keys
                .iter()
                .zip(values)
                .map(|(key, value)| format!("{}={value}", key.name))
                .collect::<Vec<_>>()
                .join("/")
        })
    }

    /// Partition key types joined by `:`
    pub fn partition_column_types(&self) -> String {
        self.partition_keys
            .iter()
            .map(|key| key.type_name.as_str())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.complete_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> UnitDescriptor {
        UnitDescriptor::table("warehouse", "sales")
            .with_column(FieldSchema::new("amount", "double"))
            .with_partition_key(FieldSchema::new("dt", "string"))
            .with_partition_key(FieldSchema::new("region", "int"))
            .with_location("/data/warehouse/sales/")
    }

    #[test]
    fn test_table_names() {
        let table = UnitDescriptor::table("warehouse", "orders");
        assert_eq!(table.shape(), UnitShape::Table);
        assert_eq!(table.complete_name(), "warehouse@orders");
        assert_eq!(table.partition_name(), None);
        assert!(!table.has_sub_units());
    }

    #[test]
    fn test_partition_names() {
        let table = sales();
        assert!(table.has_sub_units());

        let partition = table.partition(["2024-01-01", "7"]);
        assert_eq!(partition.shape(), UnitShape::Partition);
        assert!(!partition.has_sub_units());
        assert_eq!(partition.partition_name().as_deref(), Some("dt=2024-01-01/region=7"));
        assert_eq!(
            partition.complete_name(),
            "warehouse@sales@dt=2024-01-01/region=7"
        );
        assert_eq!(partition.table_complete_name(), "warehouse@sales");
        assert_eq!(partition.partition_column_types(), "string:int");
        assert_eq!(
            partition.location.as_deref(),
            Some("/data/warehouse/sales/dt=2024-01-01/region=7")
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one value per partition key")]
    fn test_partition_requires_a_value_per_key() {
        let _ = sales().partition(["2024-01-01"]);
    }

    #[test]
    fn test_descriptor_json_shape() {
        let partition = sales().partition(["2024-01-01", "7"]);
        let json = serde_json::to_value(&partition).unwrap();
        assert_eq!(json["partition_keys"][1]["type"], "int");
        assert_eq!(json["partition_values"][0], "2024-01-01");

        let table = serde_json::to_value(UnitDescriptor::table("db", "t")).unwrap();
        assert!(table.get("partition_values").is_none());
    }
}
