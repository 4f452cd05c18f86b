//! Schema-related data models.
//!
//! This module defines the types produced by warehouse introspection.

use serde::{Deserialize, Serialize};

/// One column as reported by the warehouse catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Type tag as the warehouse spells it (e.g. "integer", "nvarchar")
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

impl ColumnInfo {
    /// Create a new column descriptor.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }
}

/// Derived, never-cached metadata for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub column_count: usize,
}

impl TableMetadata {
    /// Aggregate a column list into a metadata record.
    pub fn new(table: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        let column_count = columns.len();
        Self {
            table: table.into(),
            columns,
            column_count,
        }
    }
}

/// Result of a read-only query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Column names in select-list order
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    /// True when the row limit cut the result short
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_info_serializes_type_field() {
        let col = ColumnInfo::new("id", "integer", false);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["name"], "id");
        assert_eq!(json["type"], "integer");
        assert_eq!(json["nullable"], false);
    }

    #[test]
    fn test_table_metadata_counts_columns() {
        let md = TableMetadata::new(
            "Orders",
            vec![
                ColumnInfo::new("id", "int", false),
                ColumnInfo::new("total", "numeric", true),
            ],
        );
        assert_eq!(md.column_count, 2);
        assert_eq!(md.table, "Orders");
    }
}
