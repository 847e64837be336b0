//! lf-sql - SQL parsing layer for Lineflow
//!
//! This crate wraps sqlparser-rs with dialect support, maps declared and SQL
//! type names onto canonical [`TypeTag`]s, and extracts the base tables a
//! query reads from.

pub mod dialect;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod types;

pub use dialect::{
    dialect_from_name, BigQueryDialect, DuckDbDialect, PostgresDialect, SnowflakeDialect,
    SqlDialect,
};
pub use error::{SqlError, SqlResult};
pub use extractor::extract_tables;
pub use parser::SqlParser;
pub use types::TypeTag;

use sqlparser::ast::{Ident, ObjectName};

/// Join the parts of an object name with `.`, dropping identifier quotes.
pub fn object_name_to_string(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| match part.as_ident() {
            Some(ident) => ident.value.clone(),
            None => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Last identifier of an object name (`raw.orders` -> `orders`).
pub fn object_name_last_ident(name: &ObjectName) -> Option<&Ident> {
    name.0.last().and_then(|part| part.as_ident())
}
