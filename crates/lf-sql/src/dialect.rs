//! SQL dialect abstraction

use sqlparser::ast::Statement;
use sqlparser::dialect::{
    BigQueryDialect as SqlParserBigQuery, Dialect, DuckDbDialect as SqlParserDuckDb,
    PostgreSqlDialect as SqlParserPostgres, SnowflakeDialect as SqlParserSnowflake,
};
use sqlparser::parser::Parser;

use crate::error::{SqlError, SqlResult};
use crate::types::TypeTag;

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Parse SQL into AST statements
    fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Parser::parse_sql(self.parser_dialect(), sql).map_err(|e| {
            let msg = e.to_string();
            // Extract line/column from error message (format: "... at Line: X, Column: Y")
            let (line, column) = parse_location_from_error(&msg);
            SqlError::ParseError {
                message: msg,
                line,
                column,
            }
        })
    }

    /// Map a declared schema type (or a CAST target) to a canonical tag
    fn map_declared_type(&self, declared: &str) -> TypeTag {
        TypeTag::from_declared(declared)
    }

    /// Get the dialect name
    fn name(&self) -> &'static str;
}

/// Look up a dialect by its configuration name (case-insensitive)
pub fn dialect_from_name(name: &str) -> SqlResult<Box<dyn SqlDialect>> {
    match name.trim().to_lowercase().as_str() {
        "bigquery" => Ok(Box::new(BigQueryDialect::new())),
        "duckdb" => Ok(Box::new(DuckDbDialect::new())),
        "snowflake" => Ok(Box::new(SnowflakeDialect::new())),
        "postgres" | "postgresql" => Ok(Box::new(PostgresDialect::new())),
        _ => Err(SqlError::UnknownDialect(name.to_string())),
    }
}

/// Parse line and column from sqlparser error message.
///
/// sqlparser's `ParserError` is a simple string wrapper with no structured
/// location data, so we extract "Line: N, Column: M" from the error message text.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let Some(line_idx) = msg.find("Line: ") else {
        return (0, 0);
    };
    let line_start = line_idx + 6;
    let Some(comma_idx) = msg[line_start..].find(',') else {
        return (0, 0);
    };
    let Ok(line) = msg[line_start..line_start + comma_idx]
        .trim()
        .parse::<usize>()
    else {
        return (0, 0);
    };
    let Some(col_idx) = msg.find("Column: ") else {
        return (0, 0);
    };
    let col_start = col_idx + 8;
    let col_end = msg[col_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| col_start + i)
        .unwrap_or(msg.len());
    let Ok(column) = msg[col_start..col_end].trim().parse::<usize>() else {
        return (0, 0);
    };
    (line, column)
}

/// Declare a dialect wrapping one sqlparser dialect.
///
/// An optional `map` function post-processes [`TypeTag::from_declared`].
macro_rules! sql_dialect {
    (
        $(#[$meta:meta])*
        $Name:ident($Inner:ident), name = $label:literal
        $(, map = $map:path)? $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $Name {
            dialect: $Inner,
        }

        impl $Name {
            pub fn new() -> Self {
                Self { dialect: $Inner {} }
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl SqlDialect for $Name {
            fn parser_dialect(&self) -> &dyn Dialect {
                &self.dialect
            }

            $(
                fn map_declared_type(&self, declared: &str) -> TypeTag {
                    $map(TypeTag::from_declared(declared))
                }
            )?

            fn name(&self) -> &'static str {
                $label
            }
        }
    };
}

/// BigQuery integer aliases are all INT64, and FLOAT is FLOAT64.
fn widen_bigquery(tag: TypeTag) -> TypeTag {
    match tag {
        TypeTag::TinyInt | TypeTag::SmallInt | TypeTag::Int => TypeTag::BigInt,
        TypeTag::Float => TypeTag::Double,
        other => other,
    }
}

/// Snowflake floating-point types are all 64-bit.
fn widen_snowflake(tag: TypeTag) -> TypeTag {
    match tag {
        TypeTag::Float => TypeTag::Double,
        other => other,
    }
}

sql_dialect! {
    /// BigQuery Standard SQL
    BigQueryDialect(SqlParserBigQuery), name = "bigquery", map = widen_bigquery,
}

sql_dialect! {
    /// DuckDB SQL dialect
    DuckDbDialect(SqlParserDuckDb), name = "duckdb",
}

sql_dialect! {
    /// Snowflake SQL dialect
    SnowflakeDialect(SqlParserSnowflake), name = "snowflake", map = widen_snowflake,
}

sql_dialect! {
    /// PostgreSQL dialect
    PostgresDialect(SqlParserPostgres), name = "postgres",
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
