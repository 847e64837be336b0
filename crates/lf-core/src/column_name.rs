//! Strongly-typed column name wrapper.

use crate::newtype_string::define_identifier;

define_identifier! {
    /// Name of a column declared in the schema.
    pub struct ColumnName;
}
