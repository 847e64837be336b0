//! Lineage assembly: parse, build scopes, then trace and type every output

use crate::error::{LineageError, LineageResult};
use crate::functions::{FunctionRegistry, FunctionSignatures};
use crate::infer::TypeInferencer;
use crate::lowering::ScopeBuilder;
use crate::report::{LineageReport, OutputColumn};
use crate::resolver::resolve_column;
use crate::scope::{Location, ScalarExpr, ScopeArena, ScopeId, ScopeKind};
use crate::tracer::Tracer;
use lf_core::Schema;
use lf_sql::{SqlDialect, SqlParser};

/// Reusable lineage engine: a dialect plus function signatures.
///
/// Holds no per-query state, so one engine can serve any number of
/// [`compute`](Self::compute) calls.
pub struct LineageEngine {
    parser: SqlParser,
    functions: Box<dyn FunctionSignatures>,
}

impl LineageEngine {
    /// Engine over `dialect` with the standard function table
    pub fn new(dialect: Box<dyn SqlDialect>) -> Self {
        Self {
            parser: SqlParser::new(dialect),
            functions: Box::new(FunctionRegistry::standard()),
        }
    }

    /// Engine for a dialect name (`bigquery`, `duckdb`, `snowflake`, `postgres`)
    pub fn from_dialect_name(name: &str) -> LineageResult<Self> {
        Ok(Self::new(lf_sql::dialect_from_name(name)?))
    }

    /// Replace the function signature table
    pub fn with_functions<F: FunctionSignatures + 'static>(mut self, functions: F) -> Self {
        self.functions = Box::new(functions);
        self
    }

    /// The dialect this engine parses with
    pub fn dialect(&self) -> &dyn SqlDialect {
        self.parser.dialect()
    }

    /// Compute column lineage and types for a single SELECT-style query.
    ///
    /// Either every output column resolves or the whole call fails.
    pub fn compute(&self, query: &str, schema: &Schema) -> LineageResult<LineageReport> {
        let mut statements = self.parser.parse(query)?;
        if statements.len() > 1 {
            return Err(LineageError::unsupported(format!(
                "multiple statements ({} found, expected 1)",
                statements.len()
            )));
        }
        let Some(statement) = statements.pop() else {
            return Err(lf_sql::SqlError::EmptySql.into());
        };

        let (arena, root) = ScopeBuilder::new(schema, self.dialect()).build(&statement)?;
        let tracer = Tracer::new(&arena, schema);
        let inferencer =
            TypeInferencer::new(&arena, schema, self.dialect(), self.functions.as_ref());

        let mut columns = Vec::new();
        for (position, slot) in arena.get(root).slots.iter().enumerate() {
            let upstream = tracer.trace_slot(root, position)?;
            let type_tag = inferencer.infer_slot(root, position)?;
            log::debug!(
                "{}: {} <- {} origin(s)",
                slot.name,
                type_tag,
                upstream.len()
            );
            columns.push(OutputColumn {
                name: slot.name.clone(),
                type_tag,
                upstream: upstream.into_iter().collect(),
            });
        }
        columns.sort_by(|a, b| a.name.cmp(&b.name));

        let conditions = condition_columns(&arena, root, &tracer, &inferencer)?;

        Ok(LineageReport {
            columns,
            conditions,
        })
    }
}

/// Compute lineage for `query` under the named dialect with the standard
/// function table.
pub fn compute_lineage(query: &str, schema: &Schema, dialect: &str) -> LineageResult<LineageReport> {
    LineageEngine::from_dialect_name(dialect)?.compute(query, schema)
}

/// Columns referenced by the outermost WHERE clause(s), deduplicated and
/// sorted by name
fn condition_columns(
    arena: &ScopeArena,
    root: ScopeId,
    tracer: &Tracer<'_>,
    inferencer: &TypeInferencer<'_>,
) -> LineageResult<Vec<OutputColumn>> {
    let mut conditions: Vec<OutputColumn> = Vec::new();

    for scope in filter_scopes(arena, root) {
        let Some(filter) = &arena.get(scope).filter else {
            continue;
        };
        let mut refs = Vec::new();
        column_refs(filter, &mut refs);

        for (qualifier, name, location) in refs {
            if conditions.iter().any(|c| c.name == name) {
                continue;
            }
            let target = resolve_column(arena, scope, qualifier, name, location)?;
            conditions.push(OutputColumn {
                name: name.to_string(),
                type_tag: inferencer.infer_target(target)?,
                upstream: tracer.trace_target(target)?.into_iter().collect(),
            });
        }
    }

    conditions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(conditions)
}

/// The root scope, or the leaf branches of a root set operation
fn filter_scopes(arena: &ScopeArena, scope: ScopeId) -> Vec<ScopeId> {
    match &arena.get(scope).kind {
        ScopeKind::Select => vec![scope],
        ScopeKind::SetOperation { branches } => branches
            .iter()
            .flat_map(|&b| filter_scopes(arena, b))
            .collect(),
    }
}

/// Column references of an expression in source order, not entering subqueries
fn column_refs<'e>(expr: &'e ScalarExpr, out: &mut Vec<(Option<&'e str>, &'e str, Location)>) {
    match expr {
        ScalarExpr::Column {
            qualifier,
            name,
            location,
        } => out.push((qualifier.as_deref(), name.as_str(), *location)),
        ScalarExpr::Function { args: items, .. } | ScalarExpr::Operator { operands: items, .. } => {
            for item in items {
                column_refs(item, out);
            }
        }
        ScalarExpr::Cast { expr, .. } => column_refs(expr, out),
        ScalarExpr::Case {
            operand,
            branches,
            else_result,
        } => {
            if let Some(operand) = operand {
                column_refs(operand, out);
            }
            for branch in branches {
                column_refs(&branch.condition, out);
                column_refs(&branch.result, out);
            }
            if let Some(else_result) = else_result {
                column_refs(else_result, out);
            }
        }
        ScalarExpr::Literal(_)
        | ScalarExpr::Subquery(_)
        | ScalarExpr::Wildcard
        | ScalarExpr::Unsupported => {}
    }
}

#[cfg(test)]
#[path = "assembler_test.rs"]
mod tests;
