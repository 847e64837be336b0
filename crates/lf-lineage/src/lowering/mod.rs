//! AST-to-scope lowering: converts a sqlparser statement into a scope arena

mod expr;
mod join;
mod query;
mod select;

use crate::error::{LineageError, LineageResult};
use crate::scope::{ScopeArena, ScopeId};
use lf_core::Schema;
use lf_sql::SqlDialect;
use sqlparser::ast::Statement;

/// A CTE visible to the query body being built
struct CteBinding {
    name: String,
    scope: ScopeId,
    /// Output names, after the CTE's own column list
    columns: Vec<String>,
}

/// Builds the scope graph for one statement.
///
/// Base tables are checked against the schema while building, so an
/// unknown relation fails here. Column references are only recorded;
/// they are resolved when traced.
pub struct ScopeBuilder<'a> {
    schema: &'a Schema,
    dialect: &'a dyn SqlDialect,
    arena: ScopeArena,
    /// Innermost CTE last
    ctes: Vec<CteBinding>,
}

impl<'a> ScopeBuilder<'a> {
    pub fn new(schema: &'a Schema, dialect: &'a dyn SqlDialect) -> Self {
        Self {
            schema,
            dialect,
            arena: ScopeArena::new(),
            ctes: Vec::new(),
        }
    }

    /// Lower a statement, returning the arena and the root scope
    ///
    /// Only `Statement::Query` is supported.
    pub fn build(mut self, statement: &Statement) -> LineageResult<(ScopeArena, ScopeId)> {
        let query = match statement {
            Statement::Query(query) => query,
            other => {
                return Err(LineageError::unsupported(format!(
                    "{} statement (only queries have column lineage)",
                    statement_kind(other)
                )))
            }
        };

        let root = self.build_query(query, None)?;
        log::debug!(
            "Built {} scopes for {} query, root {:?}",
            self.arena.len(),
            self.dialect.name(),
            root
        );
        Ok((self.arena, root))
    }
}

/// Leading keyword of a statement, for error messages
fn statement_kind(stmt: &Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "empty".to_string())
}

#[cfg(test)]
#[path = "lowering_test.rs"]
mod tests;
