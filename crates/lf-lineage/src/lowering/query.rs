//! Query lowering: CTEs, set operations and query bodies

use super::{CteBinding, ScopeBuilder};
use crate::error::{LineageError, LineageResult};
use crate::scope::{OutputSlot, ScopeId, ScopeKind, SlotSource};
use sqlparser::ast::{Query, SetExpr, TableAlias};

impl ScopeBuilder<'_> {
    /// Lower a query (WITH + body); ORDER BY, LIMIT and friends do not
    /// affect lineage and are skipped.
    pub(super) fn build_query(
        &mut self,
        query: &Query,
        parent: Option<ScopeId>,
    ) -> LineageResult<ScopeId> {
        let visible = self.ctes.len();

        if let Some(with) = &query.with {
            if with.recursive {
                return Err(LineageError::unsupported("WITH RECURSIVE"));
            }
            for cte in &with.cte_tables {
                let name = cte.alias.name.value.clone();
                let scope = self.build_query(&cte.query, parent)?;
                let columns = aliased_columns(self.arena.get(scope).slot_names(), Some(&cte.alias))?;
                log::debug!("CTE '{}' -> {:?} ({} columns)", name, scope, columns.len());
                self.ctes.push(CteBinding {
                    name,
                    scope,
                    columns,
                });
            }
        }

        let body = self.build_set_expr(&query.body, parent);
        self.ctes.truncate(visible);
        body
    }

    pub(super) fn build_set_expr(
        &mut self,
        body: &SetExpr,
        parent: Option<ScopeId>,
    ) -> LineageResult<ScopeId> {
        match body {
            SetExpr::Select(select) => self.build_select(select, parent),
            SetExpr::Query(query) => self.build_query(query, parent),
            SetExpr::SetOperation { .. } => {
                let mut branches = Vec::new();
                self.collect_branches(body, parent, &mut branches)?;
                self.build_set_operation(branches, parent)
            }
            SetExpr::Values(_) => Err(LineageError::unsupported("VALUES as a query body")),
            other => Err(LineageError::unsupported(format!("query body `{}`", other))),
        }
    }

    /// Flatten nested set operations into their leaf branches, left to right
    fn collect_branches(
        &mut self,
        body: &SetExpr,
        parent: Option<ScopeId>,
        out: &mut Vec<ScopeId>,
    ) -> LineageResult<()> {
        match body {
            SetExpr::SetOperation { left, right, .. } => {
                self.collect_branches(left, parent, out)?;
                self.collect_branches(right, parent, out)
            }
            other => {
                out.push(self.build_set_expr(other, parent)?);
                Ok(())
            }
        }
    }

    /// Output names come from the leftmost branch; columns align by position.
    fn build_set_operation(
        &mut self,
        branches: Vec<ScopeId>,
        parent: Option<ScopeId>,
    ) -> LineageResult<ScopeId> {
        let Some(&first) = branches.first() else {
            return Err(LineageError::unsupported("set operation without branches"));
        };
        let names = self.arena.get(first).slot_names();

        for &branch in &branches[1..] {
            let width = self.arena.get(branch).slots.len();
            if width != names.len() {
                return Err(LineageError::unsupported(format!(
                    "set operation branches project {} and {} columns",
                    names.len(),
                    width
                )));
            }
        }

        let id = self.arena.alloc(parent, ScopeKind::SetOperation { branches });
        self.arena.get_mut(id).slots = names
            .into_iter()
            .enumerate()
            .map(|(position, name)| OutputSlot {
                name,
                source: SlotSource::Branch(position),
            })
            .collect();
        Ok(id)
    }
}

/// Apply a `name(col1, col2, ..)` column list positionally.
pub(super) fn aliased_columns(
    mut columns: Vec<String>,
    alias: Option<&TableAlias>,
) -> LineageResult<Vec<String>> {
    let Some(alias) = alias else {
        return Ok(columns);
    };
    if alias.columns.len() > columns.len() {
        return Err(LineageError::unsupported(format!(
            "alias '{}' names {} columns but the relation has {}",
            alias.name.value,
            alias.columns.len(),
            columns.len()
        )));
    }
    for (column, renamed) in columns.iter_mut().zip(&alias.columns) {
        *column = renamed.name.value.clone();
    }
    Ok(columns)
}
