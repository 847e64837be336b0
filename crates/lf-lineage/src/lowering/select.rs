//! SELECT lowering: FROM bindings, projection and star expansion

use super::query::aliased_columns;
use super::ScopeBuilder;
use crate::error::{LineageError, LineageResult};
use crate::scope::{
    JoinKind, Location, OutputSlot, RelationBinding, RelationTarget, ScopeId, ScopeKind,
    SlotSource,
};
use lf_sql::{object_name_last_ident, object_name_to_string};
use sqlparser::ast::{
    ExcludeSelectItem, Expr, Select, SelectItem, SelectItemQualifiedWildcardKind, TableFactor,
    TableWithJoins, Value, WildcardAdditionalOptions,
};

impl ScopeBuilder<'_> {
    pub(super) fn build_select(
        &mut self,
        select: &Select,
        parent: Option<ScopeId>,
    ) -> LineageResult<ScopeId> {
        let id = self.arena.alloc(parent, ScopeKind::Select);

        // Comma-separated FROM items behave like cross joins
        for (i, from) in select.from.iter().enumerate() {
            let join = (i > 0).then_some(JoinKind::Predicate);
            self.bind_table_with_joins(from, id, join)?;
        }

        let mut slots = Vec::with_capacity(select.projection.len());
        for item in &select.projection {
            self.project_item(item, id, &mut slots)?;
        }
        self.arena.get_mut(id).slots = slots;

        if let Some(selection) = &select.selection {
            let filter = self.lower_expr(selection, id)?;
            self.arena.get_mut(id).filter = Some(filter);
        }

        Ok(id)
    }

    pub(super) fn bind_table_with_joins(
        &mut self,
        from: &TableWithJoins,
        scope: ScopeId,
        join: Option<JoinKind>,
    ) -> LineageResult<()> {
        self.bind_table_factor(&from.relation, scope, join)?;
        for join in &from.joins {
            self.bind_join(join, scope)?;
        }
        Ok(())
    }

    /// Add the relation(s) of one FROM/JOIN item to `scope`
    pub(super) fn bind_table_factor(
        &mut self,
        factor: &TableFactor,
        scope: ScopeId,
        join: Option<JoinKind>,
    ) -> LineageResult<()> {
        match factor {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                if args.is_some() {
                    return Err(LineageError::unsupported(format!(
                        "table function `{}`",
                        name
                    )));
                }
                let reference = object_name_to_string(name);
                let location = object_name_last_ident(name)
                    .map(Location::of)
                    .unwrap_or_default();
                let (target, columns) = self.resolve_table(&reference, location)?;
                let columns = aliased_columns(columns, alias.as_ref())?;
                self.push_relation(
                    scope,
                    RelationBinding {
                        name: reference,
                        alias: alias.as_ref().map(|a| a.name.value.clone()),
                        target,
                        columns,
                        join,
                    },
                );
                Ok(())
            }

            TableFactor::Derived {
                lateral,
                subquery,
                alias,
                ..
            } => {
                // Only a LATERAL subquery may see its siblings in this FROM clause
                let parent = if *lateral {
                    Some(scope)
                } else {
                    self.arena.get(scope).parent
                };
                let child = self.build_query(subquery, parent)?;
                let columns = aliased_columns(self.arena.get(child).slot_names(), alias.as_ref())?;
                let alias = alias.as_ref().map(|a| a.name.value.clone());
                self.push_relation(
                    scope,
                    RelationBinding {
                        name: alias.clone().unwrap_or_default(),
                        alias,
                        target: RelationTarget::Scope(child),
                        columns,
                        join,
                    },
                );
                Ok(())
            }

            TableFactor::NestedJoin {
                table_with_joins,
                alias,
                ..
            } => {
                if alias.is_some() {
                    return Err(LineageError::unsupported("aliased parenthesized join"));
                }
                self.bind_table_with_joins(table_with_joins, scope, join)
            }

            other => Err(LineageError::unsupported(format!(
                "table factor `{}`",
                other
            ))),
        }
    }

    /// CTEs shadow schema tables; qualified names never refer to a CTE.
    fn resolve_table(
        &self,
        reference: &str,
        location: Location,
    ) -> LineageResult<(RelationTarget, Vec<String>)> {
        if !reference.contains('.') {
            if let Some(cte) = self
                .ctes
                .iter()
                .rev()
                .find(|c| c.name.eq_ignore_ascii_case(reference))
            {
                return Ok((RelationTarget::Scope(cte.scope), cte.columns.clone()));
            }
        }

        match self.schema.table(reference) {
            Some(table) => Ok((
                RelationTarget::Table(table.name.to_string()),
                table.column_names().map(str::to_string).collect(),
            )),
            None => Err(LineageError::unknown_relation(reference, location)),
        }
    }

    fn push_relation(&mut self, scope: ScopeId, binding: RelationBinding) {
        log::debug!(
            "{:?}: bind '{}'{} -> {:?}",
            scope,
            binding.name,
            binding
                .alias
                .as_deref()
                .map(|a| format!(" AS {}", a))
                .unwrap_or_default(),
            binding.target
        );
        self.arena.get_mut(scope).relations.push(binding);
    }

    fn project_item(
        &mut self,
        item: &SelectItem,
        scope: ScopeId,
        slots: &mut Vec<OutputSlot>,
    ) -> LineageResult<()> {
        match item {
            SelectItem::UnnamedExpr(expr) => {
                let lowered = self.lower_expr(expr, scope)?;
                slots.push(OutputSlot {
                    name: output_name(expr).unwrap_or_else(|| format!("_col_{}", slots.len())),
                    source: SlotSource::Expr(lowered),
                });
            }
            SelectItem::ExprWithAlias { expr, alias } => {
                let lowered = self.lower_expr(expr, scope)?;
                slots.push(OutputSlot {
                    name: alias.value.clone(),
                    source: SlotSource::Expr(lowered),
                });
            }
            SelectItem::Wildcard(options) => {
                let excluded = star_exclusions(options)?;
                let expanded = self.expand_star(scope, &excluded);
                if expanded.is_empty() {
                    return Err(LineageError::unsupported("cannot expand *"));
                }
                slots.extend(expanded);
            }
            SelectItem::QualifiedWildcard(kind, options) => {
                let SelectItemQualifiedWildcardKind::ObjectName(name) = kind else {
                    return Err(LineageError::unsupported("* applied to an expression"));
                };
                let excluded = star_exclusions(options)?;
                let qualifier = object_name_to_string(name);
                let location = object_name_last_ident(name)
                    .map(Location::of)
                    .unwrap_or_default();
                let relation = self
                    .arena
                    .get(scope)
                    .find_relation(&qualifier, location)?
                    .ok_or_else(|| LineageError::unknown_relation(&qualifier, location))?;

                let binding = &self.arena.get(scope).relations[relation];
                let expanded: Vec<OutputSlot> = binding
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(_, col)| !is_excluded(&excluded, col))
                    .map(|(position, col)| OutputSlot {
                        name: col.clone(),
                        source: SlotSource::Relation { relation, position },
                    })
                    .collect();
                if expanded.is_empty() {
                    return Err(LineageError::unsupported(format!(
                        "cannot expand {}.*",
                        qualifier
                    )));
                }
                slots.extend(expanded);
            }
        }
        Ok(())
    }

    /// Coalesced columns first, then every relation's remaining columns.
    fn expand_star(&self, scope: ScopeId, excluded: &[String]) -> Vec<OutputSlot> {
        let scope = self.arena.get(scope);
        let mut slots = Vec::new();

        for (index, column) in scope.coalesced.iter().enumerate() {
            if !is_excluded(excluded, &column.name) {
                slots.push(OutputSlot {
                    name: column.name.clone(),
                    source: SlotSource::Coalesced(index),
                });
            }
        }

        for (relation, binding) in scope.relations.iter().enumerate() {
            for (position, column) in binding.columns.iter().enumerate() {
                if scope.is_coalesced_member(relation, position) || is_excluded(excluded, column) {
                    continue;
                }
                slots.push(OutputSlot {
                    name: column.clone(),
                    source: SlotSource::Relation { relation, position },
                });
            }
        }

        slots
    }
}

/// Columns removed by `* EXCEPT (..)` / `* EXCLUDE (..)`
fn star_exclusions(options: &WildcardAdditionalOptions) -> LineageResult<Vec<String>> {
    if options.opt_replace.is_some() || options.opt_rename.is_some() || options.opt_ilike.is_some()
    {
        return Err(LineageError::unsupported(
            "* with REPLACE, RENAME or ILIKE",
        ));
    }

    let mut names = Vec::new();
    if let Some(exclude) = &options.opt_exclude {
        match exclude {
            ExcludeSelectItem::Single(ident) => names.push(ident.value.clone()),
            ExcludeSelectItem::Multiple(idents) => {
                names.extend(idents.iter().map(|i| i.value.clone()))
            }
        }
    }
    if let Some(except) = &options.opt_except {
        names.push(except.first_element.value.clone());
        names.extend(except.additional_elements.iter().map(|i| i.value.clone()));
    }
    Ok(names)
}

fn is_excluded(excluded: &[String], column: &str) -> bool {
    excluded.iter().any(|e| e.eq_ignore_ascii_case(column))
}

/// Name an un-aliased projection carries on its own.
///
/// Columns give their name, string and numeric literals their text, and a
/// cast the name of its operand. Anything else (function calls included)
/// is unnamed and gets `_col_<slot index>` after star expansion.
pub(super) fn output_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|last| last.value.clone()),
        Expr::Cast { expr, .. } | Expr::Nested(expr) => output_name(expr),
        Expr::Value(value) => match &value.value {
            Value::SingleQuotedString(text)
            | Value::DoubleQuotedString(text)
            | Value::Number(text, _) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    }
}
