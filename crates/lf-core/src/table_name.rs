//! Strongly-typed table name wrapper.

use crate::newtype_string::define_identifier;

define_identifier! {
    /// Name of a base table in the schema, possibly qualified (`raw.orders`).
    ///
    /// Prevents accidental mixing of table names with column names or
    /// relation aliases.
    pub struct TableName;
}

impl TableName {
    /// Last dotted segment (`analytics.raw.orders` -> `orders`).
    pub fn last_segment(&self) -> &str {
        last_segment(self.as_str())
    }
}

/// Last dotted segment of a possibly-qualified name.
pub(crate) fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
#[path = "table_name_test.rs"]
mod tests;
