//! Error types for lf-sql

use thiserror::Error;

/// SQL parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Unknown dialect name (S003)
    #[error("[S003] Unknown SQL dialect '{0}' (expected one of: bigquery, duckdb, snowflake, postgres)")]
    UnknownDialect(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
