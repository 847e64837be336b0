//! SQL parser wrapper

use crate::dialect::{
    dialect_from_name, BigQueryDialect, DuckDbDialect, PostgresDialect, SnowflakeDialect,
    SqlDialect,
};
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;

/// SQL parser that wraps sqlparser-rs with dialect support
pub struct SqlParser {
    dialect: Box<dyn SqlDialect>,
}

impl SqlParser {
    /// Create a parser over an already-constructed dialect
    pub fn new(dialect: Box<dyn SqlDialect>) -> Self {
        Self { dialect }
    }

    /// Parser for BigQuery
    pub fn bigquery() -> Self {
        Self::new(Box::new(BigQueryDialect::new()))
    }

    /// Parser for DuckDB
    pub fn duckdb() -> Self {
        Self::new(Box::new(DuckDbDialect::new()))
    }

    /// Parser for Snowflake
    pub fn snowflake() -> Self {
        Self::new(Box::new(SnowflakeDialect::new()))
    }

    /// Parser for PostgreSQL
    pub fn postgres() -> Self {
        Self::new(Box::new(PostgresDialect::new()))
    }

    /// Create a parser from dialect name
    pub fn from_dialect_name(name: &str) -> SqlResult<Self> {
        dialect_from_name(name).map(Self::new)
    }

    /// Parse SQL into AST statements. Blank input is `EmptySql`.
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        let statements = self.dialect.parse(sql)?;
        log::debug!(
            "Parsed {} statement(s) with the {} dialect",
            statements.len(),
            self.dialect.name()
        );
        Ok(statements)
    }

    /// The dialect this parser was built with
    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
