//! Expression lowering: sqlparser Expr -> ScalarExpr

use super::ScopeBuilder;
use crate::error::LineageResult;
use crate::scope::{CaseBranch, Literal, Location, OperatorClass, ScalarExpr, ScopeId};
use lf_sql::object_name_last_ident;
use sqlparser::ast::{
    BinaryOperator, Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments,
    UnaryOperator, Value,
};

impl ScopeBuilder<'_> {
    /// Lower an expression appearing in `scope`.
    ///
    /// Scalar subqueries become child scopes of `scope`. Expression kinds
    /// with no lineage model lower to [`ScalarExpr::Unsupported`].
    pub(super) fn lower_expr(&mut self, expr: &Expr, scope: ScopeId) -> LineageResult<ScalarExpr> {
        let lowered = match expr {
            Expr::Identifier(ident) => ScalarExpr::Column {
                qualifier: None,
                name: ident.value.clone(),
                location: Location::of(ident),
            },

            Expr::CompoundIdentifier(idents) => match idents.split_last() {
                Some((column, [])) => ScalarExpr::Column {
                    qualifier: None,
                    name: column.value.clone(),
                    location: Location::of(column),
                },
                Some((column, qualifier)) => ScalarExpr::Column {
                    qualifier: Some(
                        qualifier
                            .iter()
                            .map(|i| i.value.as_str())
                            .collect::<Vec<_>>()
                            .join("."),
                    ),
                    name: column.value.clone(),
                    location: Location::of(column),
                },
                None => ScalarExpr::Unsupported,
            },

            Expr::Value(value) => ScalarExpr::Literal(classify_literal(&value.value)),

            Expr::Nested(inner) => self.lower_expr(inner, scope)?,

            Expr::BinaryOp { left, op, right } => ScalarExpr::Operator {
                class: binary_class(op),
                operands: vec![self.lower_expr(left, scope)?, self.lower_expr(right, scope)?],
            },

            Expr::UnaryOp { op, expr: inner } => ScalarExpr::Operator {
                class: match op {
                    UnaryOperator::Not => OperatorClass::Negation,
                    UnaryOperator::Plus | UnaryOperator::Minus => OperatorClass::Sign,
                    _ => OperatorClass::Other,
                },
                operands: vec![self.lower_expr(inner, scope)?],
            },

            Expr::IsNull(inner)
            | Expr::IsNotNull(inner)
            | Expr::IsTrue(inner)
            | Expr::IsNotTrue(inner)
            | Expr::IsFalse(inner)
            | Expr::IsNotFalse(inner) => self.predicate(scope, [inner.as_ref()])?,

            Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
                self.predicate(scope, [left.as_ref(), right.as_ref()])?
            }

            Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
                self.predicate(scope, [expr.as_ref(), pattern.as_ref()])?
            }

            Expr::Between {
                expr, low, high, ..
            } => self.predicate(scope, [expr.as_ref(), low.as_ref(), high.as_ref()])?,

            Expr::InList { expr, list, .. } => {
                self.predicate(scope, std::iter::once(expr.as_ref()).chain(list.iter()))?
            }

            // The subquery only filters; its columns are not traced
            Expr::InSubquery { expr, .. } => self.predicate(scope, [expr.as_ref()])?,

            Expr::Exists { .. } => ScalarExpr::Operator {
                class: OperatorClass::Predicate,
                operands: Vec::new(),
            },

            Expr::Subquery(query) => ScalarExpr::Subquery(self.build_query(query, Some(scope))?),

            Expr::Function(func) => self.lower_function(func, scope)?,

            Expr::Cast {
                expr: inner,
                data_type,
                ..
            } => ScalarExpr::Cast {
                expr: Box::new(self.lower_expr(inner, scope)?),
                target: self.dialect.map_declared_type(&data_type.to_string()),
            },

            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                let operand = match operand {
                    Some(op) => Some(Box::new(self.lower_expr(op, scope)?)),
                    None => None,
                };
                let mut branches = Vec::with_capacity(conditions.len());
                for when in conditions {
                    branches.push(CaseBranch {
                        condition: self.lower_expr(&when.condition, scope)?,
                        result: self.lower_expr(&when.result, scope)?,
                    });
                }
                let else_result = match else_result {
                    Some(e) => Some(Box::new(self.lower_expr(e, scope)?)),
                    None => None,
                };
                ScalarExpr::Case {
                    operand,
                    branches,
                    else_result,
                }
            }

            Expr::Substring {
                expr,
                substring_from,
                substring_for,
                ..
            } => {
                let mut args = vec![self.lower_expr(expr, scope)?];
                for extra in [substring_from, substring_for].into_iter().flatten() {
                    args.push(self.lower_expr(extra, scope)?);
                }
                ScalarExpr::Function {
                    name: "substring".to_string(),
                    args,
                }
            }

            Expr::Trim { expr, .. } => ScalarExpr::Function {
                name: "trim".to_string(),
                args: vec![self.lower_expr(expr, scope)?],
            },

            Expr::Extract { expr, .. } => ScalarExpr::Function {
                name: "extract".to_string(),
                args: vec![self.lower_expr(expr, scope)?],
            },

            Expr::Tuple(items) => ScalarExpr::Operator {
                class: OperatorClass::Other,
                operands: self.lower_all(scope, items.iter())?,
            },

            other => {
                log::debug!("No lineage model for expression `{}`", other);
                ScalarExpr::Unsupported
            }
        };
        Ok(lowered)
    }

    fn lower_function(&mut self, func: &Function, scope: ScopeId) -> LineageResult<ScalarExpr> {
        let name = match object_name_last_ident(&func.name) {
            Some(ident) => ident.value.clone(),
            None => func.name.to_string(),
        };

        // FILTER, OVER and WITHIN GROUP clauses are not part of the value
        let args = match &func.args {
            FunctionArguments::None => Vec::new(),
            FunctionArguments::Subquery(query) => {
                vec![ScalarExpr::Subquery(self.build_query(query, Some(scope))?)]
            }
            FunctionArguments::List(list) => {
                let mut args = Vec::with_capacity(list.args.len());
                for arg in &list.args {
                    let arg_expr = match arg {
                        FunctionArg::Unnamed(e)
                        | FunctionArg::Named { arg: e, .. }
                        | FunctionArg::ExprNamed { arg: e, .. } => e,
                    };
                    args.push(match arg_expr {
                        FunctionArgExpr::Expr(e) => self.lower_expr(e, scope)?,
                        FunctionArgExpr::QualifiedWildcard(_) | FunctionArgExpr::Wildcard => {
                            ScalarExpr::Wildcard
                        }
                    });
                }
                args
            }
        };

        Ok(ScalarExpr::Function { name, args })
    }

    fn predicate<'e>(
        &mut self,
        scope: ScopeId,
        operands: impl IntoIterator<Item = &'e Expr>,
    ) -> LineageResult<ScalarExpr> {
        Ok(ScalarExpr::Operator {
            class: OperatorClass::Predicate,
            operands: self.lower_all(scope, operands)?,
        })
    }

    fn lower_all<'e>(
        &mut self,
        scope: ScopeId,
        exprs: impl IntoIterator<Item = &'e Expr>,
    ) -> LineageResult<Vec<ScalarExpr>> {
        exprs
            .into_iter()
            .map(|e| self.lower_expr(e, scope))
            .collect()
    }
}

fn binary_class(op: &BinaryOperator) -> OperatorClass {
    match op {
        BinaryOperator::Eq
        | BinaryOperator::NotEq
        | BinaryOperator::Lt
        | BinaryOperator::LtEq
        | BinaryOperator::Gt
        | BinaryOperator::GtEq
        | BinaryOperator::Spaceship => OperatorClass::Comparison,
        BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Xor => OperatorClass::Logical,
        BinaryOperator::Plus
        | BinaryOperator::Minus
        | BinaryOperator::Multiply
        | BinaryOperator::Modulo => OperatorClass::Arithmetic,
        BinaryOperator::Divide => OperatorClass::Division,
        BinaryOperator::StringConcat => OperatorClass::Concat,
        _ => OperatorClass::Other,
    }
}

fn classify_literal(value: &Value) -> Literal {
    match value {
        Value::SingleQuotedString(_)
        | Value::DoubleQuotedString(_)
        | Value::EscapedStringLiteral(_)
        | Value::NationalStringLiteral(_) => Literal::String,
        Value::Number(text, _) => {
            if text.contains(['.', 'e', 'E']) {
                Literal::Float
            } else {
                Literal::Integer
            }
        }
        Value::Boolean(_) => Literal::Boolean,
        Value::Null => Literal::Null,
        _ => Literal::Other,
    }
}
