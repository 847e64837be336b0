//! Expression tracer: maps a lowered expression to the base-table columns
//! it reads

use crate::error::{LineageError, LineageResult};
use crate::report::Origin;
use crate::resolver::{resolve_column, ColumnTarget};
use crate::scope::{
    Location, RelationTarget, ScalarExpr, ScopeArena, ScopeId, ScopeKind, SlotSource, SlotStack,
};
use lf_core::Schema;
use std::collections::BTreeSet;

/// Walks scope slots and expressions down to base-table columns
pub struct Tracer<'a> {
    arena: &'a ScopeArena,
    schema: &'a Schema,
    active: SlotStack,
}

impl<'a> Tracer<'a> {
    pub fn new(arena: &'a ScopeArena, schema: &'a Schema) -> Self {
        Self {
            arena,
            schema,
            active: SlotStack::default(),
        }
    }

    /// Origins of an expression evaluated in `scope`.
    ///
    /// Function, operator and cast results depend on all of their inputs.
    /// Literals and wildcards depend on nothing.
    pub fn trace(&self, scope: ScopeId, expr: &ScalarExpr) -> LineageResult<BTreeSet<Origin>> {
        let mut origins = BTreeSet::new();
        self.collect(scope, expr, &mut origins)?;
        Ok(origins)
    }

    /// Origins of output slot `position` of `scope`
    pub fn trace_slot(&self, scope: ScopeId, position: usize) -> LineageResult<BTreeSet<Origin>> {
        let mut origins = BTreeSet::new();
        self.collect_slot(scope, position, &mut origins)?;
        Ok(origins)
    }

    /// Origins of a resolved column
    pub fn trace_target(&self, target: ColumnTarget) -> LineageResult<BTreeSet<Origin>> {
        let mut origins = BTreeSet::new();
        self.collect_target(target, &mut origins)?;
        Ok(origins)
    }

    fn collect(
        &self,
        scope: ScopeId,
        expr: &ScalarExpr,
        out: &mut BTreeSet<Origin>,
    ) -> LineageResult<()> {
        match expr {
            ScalarExpr::Column {
                qualifier,
                name,
                location,
            } => {
                let target =
                    resolve_column(self.arena, scope, qualifier.as_deref(), name, *location)?;
                self.collect_target(target, out)
            }
            ScalarExpr::Function { args, .. } => {
                for arg in args {
                    self.collect(scope, arg, out)?;
                }
                Ok(())
            }
            ScalarExpr::Operator { operands, .. } => {
                for operand in operands {
                    self.collect(scope, operand, out)?;
                }
                Ok(())
            }
            ScalarExpr::Cast { expr, .. } => self.collect(scope, expr, out),
            ScalarExpr::Case {
                operand,
                branches,
                else_result,
            } => {
                if let Some(operand) = operand {
                    self.collect(scope, operand, out)?;
                }
                for branch in branches {
                    self.collect(scope, &branch.condition, out)?;
                    self.collect(scope, &branch.result, out)?;
                }
                if let Some(else_result) = else_result {
                    self.collect(scope, else_result, out)?;
                }
                Ok(())
            }
            ScalarExpr::Subquery(child) => {
                for position in 0..self.arena.get(*child).slots.len() {
                    self.collect_slot(*child, position, out)?;
                }
                Ok(())
            }
            ScalarExpr::Literal(_) | ScalarExpr::Wildcard | ScalarExpr::Unsupported => Ok(()),
        }
    }

    fn collect_slot(
        &self,
        scope: ScopeId,
        position: usize,
        out: &mut BTreeSet<Origin>,
    ) -> LineageResult<()> {
        self.active.enter(scope, position)?;
        let result = self.collect_slot_source(scope, position, out);
        self.active.leave();
        result
    }

    fn collect_slot_source(
        &self,
        scope: ScopeId,
        position: usize,
        out: &mut BTreeSet<Origin>,
    ) -> LineageResult<()> {
        let current = self.arena.get(scope);
        let Some(slot) = current.slots.get(position) else {
            return Err(LineageError::unsupported(format!(
                "reference to output column {} of a {}-column relation",
                position + 1,
                current.slots.len()
            )));
        };

        match &slot.source {
            SlotSource::Expr(expr) => self.collect(scope, expr, out),
            SlotSource::Relation { relation, position } => self.collect_target(
                ColumnTarget::Relation {
                    scope,
                    relation: *relation,
                    position: *position,
                },
                out,
            ),
            SlotSource::Coalesced(index) => self.collect_target(
                ColumnTarget::Coalesced {
                    scope,
                    index: *index,
                },
                out,
            ),
            SlotSource::Branch(position) => match &current.kind {
                ScopeKind::SetOperation { branches } => {
                    for branch in branches {
                        self.collect_slot(*branch, *position, out)?;
                    }
                    Ok(())
                }
                ScopeKind::Select => Err(LineageError::unsupported(
                    "branch-aligned column outside a set operation",
                )),
            },
        }
    }

    fn collect_target(
        &self,
        target: ColumnTarget,
        out: &mut BTreeSet<Origin>,
    ) -> LineageResult<()> {
        match target {
            ColumnTarget::Relation {
                scope,
                relation,
                position,
            } => {
                let binding = &self.arena.get(scope).relations[relation];
                match &binding.target {
                    RelationTarget::Table(reference) => {
                        let column = self
                            .schema
                            .table(reference)
                            .and_then(|t| t.columns.get(position).map(|c| (t, c)));
                        let Some((table, column)) = column else {
                            return Err(LineageError::unknown_relation(
                                reference,
                                Location::default(),
                            ));
                        };
                        out.insert(Origin::new(table.name.as_str(), column.name.as_str()));
                        Ok(())
                    }
                    RelationTarget::Scope(child) => self.collect_slot(*child, position, out),
                }
            }
            ColumnTarget::Coalesced { scope, index } => {
                let current = self.arena.get(scope);
                for &(relation, position) in &current.coalesced[index].members {
                    self.collect_target(
                        ColumnTarget::Relation {
                            scope,
                            relation,
                            position,
                        },
                        out,
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "tracer_test.rs"]
mod tests;
