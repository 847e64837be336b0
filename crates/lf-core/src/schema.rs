//! Table schema model
//!
//! A [`Schema`] maps table names to their ordered column declarations. Order
//! is significant: `SELECT *` expands columns in the order they were
//! declared, so the document mapping is read entry by entry rather than
//! through a hash map.

use crate::column_name::ColumnName;
use crate::error::{CoreError, CoreResult};
use crate::table_name::{last_segment, TableName};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// A single column declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name as declared
    pub name: ColumnName,
    /// Declared type (`str`, `int64`, `VARCHAR(10)`, ...)
    pub declared_type: String,
}

/// A base table and its ordered columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name as declared
    pub name: TableName,
    /// Columns in declaration order
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Find a column by name (case-insensitive), returning its position
    pub fn column(&self, name: &str) -> Option<(usize, &ColumnDef)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, col)| col.name.matches(name))
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Immutable table -> column -> declared type mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with `(column, declared_type)` pairs, in order.
    ///
    /// Panics if the table name or any column name is empty. Catalogs from
    /// untrusted input should go through deserialization or [`Schema::load`],
    /// which reject empty names with an error.
    pub fn with_table<I, C, T>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = (C, T)>,
        C: Into<String>,
        T: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(c, t)| ColumnDef {
                name: ColumnName::new(c),
                declared_type: t.into(),
            })
            .collect();
        self.tables.push(TableSchema {
            name: TableName::new(name),
            columns,
        });
        self
    }

    /// All tables in declaration order
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no tables are declared
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Look up a table referenced from SQL.
    ///
    /// Tries the exact name, then a case-insensitive match, then the last
    /// dotted segment of a qualified reference (`raw.orders` -> `orders`).
    pub fn table(&self, reference: &str) -> Option<&TableSchema> {
        if let Some(t) = self.tables.iter().find(|t| t.name == reference) {
            return Some(t);
        }
        if let Some(t) = self.tables.iter().find(|t| t.name.matches(reference)) {
            return Some(t);
        }
        let short = last_segment(reference);
        if short.len() == reference.len() {
            return None;
        }
        self.tables.iter().find(|t| t.name.matches(short))
    }

    /// Load a standalone schema file (`.json`, otherwise YAML)
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let schema: Schema = parse_document(path, &content)?;
        schema.validate()?;
        log::debug!(
            "Loaded schema with {} tables from {}",
            schema.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Reject empty table names, tables without columns, duplicate tables
    /// and duplicate columns (all compared case-insensitively).
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen_tables = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "Table name cannot be empty".to_string(),
                });
            }
            if !seen_tables.insert(table.name.to_ascii_lowercase()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Duplicate table '{}' in schema", table.name),
                });
            }
            if table.columns.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Table '{}' declares no columns", table.name),
                });
            }
            let mut seen_columns = HashSet::new();
            for col in &table.columns {
                if !seen_columns.insert(col.name.to_ascii_lowercase()) {
                    return Err(CoreError::ConfigInvalid {
                        message: format!(
                            "Duplicate column '{}' in table '{}'",
                            col.name, table.name
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Deserialize a YAML or JSON document depending on the file extension
pub(crate) fn parse_document<T: serde::de::DeserializeOwned>(
    path: &Path,
    content: &str,
) -> CoreResult<T> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(content).map_err(|e| CoreError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })
    } else {
        serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Ordered column list of one table, read straight from the mapping
struct ColumnList(Vec<ColumnDef>);

impl<'de> Deserialize<'de> for ColumnList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnListVisitor;

        impl<'de> Visitor<'de> for ColumnListVisitor {
            type Value = ColumnList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of column name to declared type")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut columns = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, declared_type)) = map.next_entry::<ColumnName, String>()? {
                    columns.push(ColumnDef {
                        name,
                        declared_type,
                    });
                }
                Ok(ColumnList(columns))
            }
        }

        deserializer.deserialize_map(ColumnListVisitor)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of table name to columns")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut tables = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, ColumnList(columns))) =
                    map.next_entry::<TableName, ColumnList>()?
                {
                    tables.push(TableSchema { name, columns });
                }
                Ok(Schema { tables })
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

/// Serializes back to the ordered `table -> {column -> type}` mapping
impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Columns<'a>(&'a [ColumnDef]);

        impl Serialize for Columns<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for col in self.0 {
                    map.serialize_entry(col.name.as_str(), &col.declared_type)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(table.name.as_str(), &Columns(&table.columns))?;
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
