//! Error types for lf-lineage

use crate::scope::Location;
use lf_sql::SqlError;
use thiserror::Error;

/// Lineage resolution error
///
/// Any of these aborts the computation for the query; a report is never
/// returned partially filled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineageError {
    /// L001: Relation not found in scope, among CTEs or in the schema
    #[error("[L001] Unknown relation '{name}' at line {line}, column {column}")]
    UnknownRelation {
        name: String,
        line: u64,
        column: u64,
    },

    /// L002: Reference matches more than one visible relation
    #[error("[L002] Ambiguous reference '{name}' at line {line}, column {column}")]
    AmbiguousAlias {
        name: String,
        line: u64,
        column: u64,
    },

    /// L003: Column not exposed by any visible relation
    #[error("[L003] Unknown column '{name}' at line {line}, column {column}")]
    UnknownColumn {
        name: String,
        line: u64,
        column: u64,
    },

    /// L004: Query structure the scope builder cannot model
    #[error("[L004] Unsupported construct: {construct}")]
    UnsupportedConstruct { construct: String },

    /// L005: Parse or dialect error from the SQL layer
    #[error("[L005] {0}")]
    Parse(#[from] SqlError),
}

impl LineageError {
    pub(crate) fn unknown_relation(name: impl Into<String>, at: Location) -> Self {
        LineageError::UnknownRelation {
            name: name.into(),
            line: at.line,
            column: at.column,
        }
    }

    pub(crate) fn ambiguous(name: impl Into<String>, at: Location) -> Self {
        LineageError::AmbiguousAlias {
            name: name.into(),
            line: at.line,
            column: at.column,
        }
    }

    pub(crate) fn unknown_column(name: impl Into<String>, at: Location) -> Self {
        LineageError::UnknownColumn {
            name: name.into(),
            line: at.line,
            column: at.column,
        }
    }

    pub(crate) fn unsupported(construct: impl Into<String>) -> Self {
        LineageError::UnsupportedConstruct {
            construct: construct.into(),
        }
    }
}

/// Result type alias for LineageError
pub type LineageResult<T> = Result<T, LineageError>;
