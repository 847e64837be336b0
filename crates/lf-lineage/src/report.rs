//! Lineage report types

use lf_sql::TypeTag;
use serde::{Deserialize, Serialize};

/// A base-table column an output value is derived from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Origin {
    /// Table name as declared in the schema
    pub table: String,
    /// Column name as declared in the schema
    pub column: String,
}

impl Origin {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Lineage and inferred type of one output (or condition) column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    /// Sorted, deduplicated origins
    pub upstream: Vec<Origin>,
}

/// Result of a lineage computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageReport {
    /// Output columns, sorted by name
    pub columns: Vec<OutputColumn>,
    /// Columns referenced by the outermost WHERE clause, sorted by name.
    /// Serialized as a `conditions` list, one entry per column; absent when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<OutputColumn>,
}

impl LineageReport {
    /// First output column with this exact name
    pub fn column(&self, name: &str) -> Option<&OutputColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Output column names in report order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
