//! Type inference over lowered expressions

use crate::error::{LineageError, LineageResult};
use crate::functions::FunctionSignatures;
use crate::resolver::{resolve_column, ColumnTarget};
use crate::scope::{
    CaseBranch, Literal, Location, OperatorClass, RelationTarget, ScalarExpr, ScopeArena, ScopeId,
    ScopeKind, SlotSource, SlotStack,
};
use lf_core::Schema;
use lf_sql::{SqlDialect, TypeTag};

/// Infers a canonical [`TypeTag`] for output slots and expressions
pub struct TypeInferencer<'a> {
    arena: &'a ScopeArena,
    schema: &'a Schema,
    dialect: &'a dyn SqlDialect,
    functions: &'a dyn FunctionSignatures,
    active: SlotStack,
}

impl<'a> TypeInferencer<'a> {
    pub fn new(
        arena: &'a ScopeArena,
        schema: &'a Schema,
        dialect: &'a dyn SqlDialect,
        functions: &'a dyn FunctionSignatures,
    ) -> Self {
        Self {
            arena,
            schema,
            dialect,
            functions,
            active: SlotStack::default(),
        }
    }

    /// Type of an expression evaluated in `scope`
    pub fn infer_type(&self, scope: ScopeId, expr: &ScalarExpr) -> LineageResult<TypeTag> {
        let tag = match expr {
            ScalarExpr::Column {
                qualifier,
                name,
                location,
            } => {
                let target =
                    resolve_column(self.arena, scope, qualifier.as_deref(), name, *location)?;
                self.infer_target(target)?
            }
            ScalarExpr::Literal(literal) => literal_type(*literal),
            ScalarExpr::Function { name, args } => {
                let arg_types = args
                    .iter()
                    .map(|arg| self.infer_type(scope, arg))
                    .collect::<LineageResult<Vec<_>>>()?;
                self.functions
                    .return_type(name, &arg_types)
                    .unwrap_or(TypeTag::Unknown)
            }
            ScalarExpr::Operator { class, operands } => self.operator_type(scope, *class, operands)?,
            ScalarExpr::Cast { target, .. } => *target,
            ScalarExpr::Case {
                branches,
                else_result,
                ..
            } => self.case_type(scope, branches, else_result.as_deref())?,
            ScalarExpr::Subquery(child) => {
                if self.arena.get(*child).slots.is_empty() {
                    TypeTag::Unknown
                } else {
                    self.infer_slot(*child, 0)?
                }
            }
            ScalarExpr::Wildcard | ScalarExpr::Unsupported => TypeTag::Unknown,
        };
        Ok(tag)
    }

    /// Type of output slot `position` of `scope`
    pub fn infer_slot(&self, scope: ScopeId, position: usize) -> LineageResult<TypeTag> {
        self.active.enter(scope, position)?;
        let tag = self.infer_slot_source(scope, position);
        self.active.leave();
        tag
    }

    fn infer_slot_source(&self, scope: ScopeId, position: usize) -> LineageResult<TypeTag> {
        let current = self.arena.get(scope);
        let Some(slot) = current.slots.get(position) else {
            return Err(LineageError::unsupported(format!(
                "reference to output column {} of a {}-column relation",
                position + 1,
                current.slots.len()
            )));
        };

        match &slot.source {
            SlotSource::Expr(expr) => self.infer_type(scope, expr),
            SlotSource::Relation { relation, position } => self.infer_target(ColumnTarget::Relation {
                scope,
                relation: *relation,
                position: *position,
            }),
            SlotSource::Coalesced(index) => self.infer_target(ColumnTarget::Coalesced {
                scope,
                index: *index,
            }),
            // First branch decides
            SlotSource::Branch(position) => match &current.kind {
                ScopeKind::SetOperation { branches } => match branches.first() {
                    Some(first) => self.infer_slot(*first, *position),
                    None => Ok(TypeTag::Unknown),
                },
                ScopeKind::Select => Ok(TypeTag::Unknown),
            },
        }
    }

    /// Type of a resolved column
    pub fn infer_target(&self, target: ColumnTarget) -> LineageResult<TypeTag> {
        match target {
            ColumnTarget::Relation {
                scope,
                relation,
                position,
            } => match &self.arena.get(scope).relations[relation].target {
                RelationTarget::Table(reference) => {
                    let column = self
                        .schema
                        .table(reference)
                        .and_then(|t| t.columns.get(position));
                    match column {
                        Some(column) => Ok(self.dialect.map_declared_type(&column.declared_type)),
                        None => Err(LineageError::unknown_relation(
                            reference,
                            Location::default(),
                        )),
                    }
                }
                RelationTarget::Scope(child) => self.infer_slot(*child, position),
            },
            ColumnTarget::Coalesced { scope, index } => {
                let column = &self.arena.get(scope).coalesced[index];
                match column.members.first() {
                    Some(&(relation, position)) => self.infer_target(ColumnTarget::Relation {
                        scope,
                        relation,
                        position,
                    }),
                    None => Ok(TypeTag::Unknown),
                }
            }
        }
    }

    fn operator_type(
        &self,
        scope: ScopeId,
        class: OperatorClass,
        operands: &[ScalarExpr],
    ) -> LineageResult<TypeTag> {
        let tag = match class {
            OperatorClass::Comparison
            | OperatorClass::Logical
            | OperatorClass::Predicate
            | OperatorClass::Negation => TypeTag::Bool,
            OperatorClass::Concat => TypeTag::Text,
            OperatorClass::Division => TypeTag::Double,
            OperatorClass::Arithmetic => self.arithmetic_type(scope, operands)?,
            OperatorClass::Sign => match operands.first() {
                Some(operand) => self.infer_type(scope, operand)?,
                None => TypeTag::Unknown,
            },
            OperatorClass::Other => TypeTag::Unknown,
        };
        Ok(tag)
    }

    /// The shared operand type. Integer literals adopt the width of an
    /// integer column operand; any other mismatch is UNKNOWN.
    fn arithmetic_type(&self, scope: ScopeId, operands: &[ScalarExpr]) -> LineageResult<TypeTag> {
        let typed = operands
            .iter()
            .map(|op| {
                let flexible = matches!(op, ScalarExpr::Literal(Literal::Integer));
                self.infer_type(scope, op).map(|tag| (tag, flexible))
            })
            .collect::<LineageResult<Vec<_>>>()?;
        let anchor = typed
            .iter()
            .find(|(_, flexible)| !flexible)
            .or_else(|| typed.first())
            .map(|&(tag, _)| tag);
        let Some(anchor) = anchor else {
            return Ok(TypeTag::Unknown);
        };
        let agrees = typed
            .iter()
            .all(|&(tag, flexible)| tag == anchor || (flexible && anchor.is_integer()));
        Ok(if agrees { anchor } else { TypeTag::Unknown })
    }

    /// VARCHAR when every non-NULL result is a string literal, otherwise
    /// the first non-NULL result's type.
    fn case_type(
        &self,
        scope: ScopeId,
        branches: &[CaseBranch],
        else_result: Option<&ScalarExpr>,
    ) -> LineageResult<TypeTag> {
        let results: Vec<&ScalarExpr> = branches
            .iter()
            .map(|b| &b.result)
            .chain(else_result)
            .filter(|r| !matches!(r, ScalarExpr::Literal(Literal::Null)))
            .collect();

        if results.is_empty() {
            return Ok(TypeTag::Unknown);
        }
        if results
            .iter()
            .all(|r| matches!(r, ScalarExpr::Literal(Literal::String)))
        {
            return Ok(TypeTag::Varchar);
        }
        self.infer_type(scope, results[0])
    }
}

fn literal_type(literal: Literal) -> TypeTag {
    match literal {
        Literal::String => TypeTag::Varchar,
        Literal::Integer => TypeTag::Int,
        Literal::Float => TypeTag::Double,
        Literal::Boolean => TypeTag::Bool,
        Literal::Null | Literal::Other => TypeTag::Unknown,
    }
}

#[cfg(test)]
#[path = "infer_test.rs"]
mod tests;
