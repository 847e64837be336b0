//! lf-core - Core library for Lineflow
//!
//! This crate provides the schema model handed to the lineage engine,
//! strongly-typed table and column names, and the YAML/JSON configuration
//! file shared by the CLI.

pub mod column_name;
pub mod config;
pub mod error;
mod newtype_string;
pub mod schema;
pub mod table_name;

pub use column_name::ColumnName;
pub use config::{Dialect, LineageConfig};
pub use error::{CoreError, CoreResult};
pub use schema::{ColumnDef, Schema, TableSchema};
pub use table_name::TableName;
