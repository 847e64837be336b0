//! Scope graph: one node per SELECT block, derived table, CTE body and
//! set operation
//!
//! Scopes live in a [`ScopeArena`] and refer to each other by [`ScopeId`].
//! Parent links point at the enclosing scope whose relations a correlated
//! reference may see. The arena is built once per query and only read
//! afterwards.

use crate::error::{LineageError, LineageResult};
use lf_sql::TypeTag;
use sqlparser::ast::Ident;
use std::cell::RefCell;

/// Index of a scope inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

/// 1-based line/column of an identifier in the query text (0 when unknown)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: u64,
    pub column: u64,
}

impl Location {
    /// Start position of an identifier
    pub fn of(ident: &Ident) -> Self {
        Location {
            line: ident.span.start.line,
            column: ident.span.start.column,
        }
    }
}

/// Lowered scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr {
    /// `col` or `qualifier.col`
    Column {
        qualifier: Option<String>,
        name: String,
        location: Location,
    },
    /// Constant
    Literal(Literal),
    /// Scalar, aggregate or window function call
    Function { name: String, args: Vec<ScalarExpr> },
    /// Operator application
    Operator {
        class: OperatorClass,
        operands: Vec<ScalarExpr>,
    },
    /// `CAST(expr AS target)` and its variants
    Cast {
        expr: Box<ScalarExpr>,
        target: TypeTag,
    },
    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
    Case {
        operand: Option<Box<ScalarExpr>>,
        branches: Vec<CaseBranch>,
        else_result: Option<Box<ScalarExpr>>,
    },
    /// Scalar subquery, built as its own scope
    Subquery(ScopeId),
    /// `*` as a function argument (`COUNT(*)`)
    Wildcard,
    /// Anything the lowering does not model
    Unsupported,
}

/// One `WHEN condition THEN result` arm
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub condition: ScalarExpr,
    pub result: ScalarExpr,
}

/// Literal kind; the value itself never matters for lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Other,
}

/// Operator family, which is all type inference needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// `= <> < <= > >=`
    Comparison,
    /// `AND OR XOR`
    Logical,
    /// `+ - * %`
    Arithmetic,
    /// `/`
    Division,
    /// `||`
    Concat,
    /// `IS NULL`, `LIKE`, `BETWEEN`, `IN`, `EXISTS`, ...
    Predicate,
    /// `NOT`
    Negation,
    /// Unary `+` / `-`
    Sign,
    /// Any other operator
    Other,
}

/// What a relation binding points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTarget {
    /// Base table, by its schema name
    Table(String),
    /// Derived table or CTE body
    Scope(ScopeId),
}

/// How a relation was joined to the relations before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKind {
    /// `ON`, no constraint, comma or cross join
    Predicate,
    /// `USING(..)` / `NATURAL`: the listed columns are merged
    Coalescing { columns: Vec<String> },
}

/// An input relation of a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationBinding {
    /// Relation name as written (`raw.orders`, CTE name, empty for an
    /// anonymous subquery)
    pub name: String,
    /// Explicit alias
    pub alias: Option<String>,
    pub target: RelationTarget,
    /// Exposed column names, after any `t(x, y)` column aliases
    pub columns: Vec<String>,
    /// `None` for the first relation of a FROM clause
    pub join: Option<JoinKind>,
}

impl RelationBinding {
    /// Position of an exposed column (case-insensitive)
    pub fn position_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Does `qualifier` name this relation?
    ///
    /// An aliased relation answers only to its alias. Otherwise the written
    /// name matches, with `raw.orders` and `orders` treated as the same.
    pub fn answers_to(&self, qualifier: &str) -> bool {
        match &self.alias {
            Some(alias) => alias.eq_ignore_ascii_case(qualifier),
            None if self.name.is_empty() => false,
            None => {
                self.name.eq_ignore_ascii_case(qualifier)
                    || last_segment(&self.name).eq_ignore_ascii_case(last_segment(qualifier))
            }
        }
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// One logical column produced by `USING`/`NATURAL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoalescedColumn {
    pub name: String,
    /// `(relation index, column position)` of every merged side
    pub members: Vec<(usize, usize)>,
}

/// Where an output slot gets its value
#[derive(Debug, Clone, PartialEq)]
pub enum SlotSource {
    /// Projected expression
    Expr(ScalarExpr),
    /// Star-expanded column of one relation
    Relation { relation: usize, position: usize },
    /// Star-expanded coalesced column
    Coalesced(usize),
    /// Set operation: the same position in every branch
    Branch(usize),
}

/// A projected output column
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSlot {
    pub name: String,
    pub source: SlotSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    Select,
    SetOperation { branches: Vec<ScopeId> },
}

/// A node of the scope graph
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    /// Relations of `parent` bound before this scope was created; only
    /// those are visible to correlated references
    pub parent_visible: usize,
    pub kind: ScopeKind,
    pub relations: Vec<RelationBinding>,
    pub coalesced: Vec<CoalescedColumn>,
    pub slots: Vec<OutputSlot>,
    /// Lowered WHERE clause
    pub filter: Option<ScalarExpr>,
}

impl Scope {
    /// Find the local relation a qualifier refers to.
    ///
    /// Aliases are checked first; two relations answering to the same
    /// qualifier is an ambiguity.
    pub fn find_relation(
        &self,
        qualifier: &str,
        location: Location,
    ) -> LineageResult<Option<usize>> {
        self.find_visible_relation(qualifier, location, self.relations.len())
    }

    /// [`find_relation`](Self::find_relation) over the first `visible`
    /// relations only
    pub fn find_visible_relation(
        &self,
        qualifier: &str,
        location: Location,
        visible: usize,
    ) -> LineageResult<Option<usize>> {
        let matches: Vec<usize> = self.relations[..visible.min(self.relations.len())]
            .iter()
            .enumerate()
            .filter(|(_, r)| r.answers_to(qualifier))
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(LineageError::ambiguous(qualifier, location)),
        }
    }

    /// Index of the coalesced column with this name
    pub fn find_coalesced(&self, name: &str) -> Option<usize> {
        self.find_visible_coalesced(name, self.relations.len())
    }

    /// Coalesced column whose merged relations are all among the first
    /// `visible`
    pub fn find_visible_coalesced(&self, name: &str, visible: usize) -> Option<usize> {
        self.coalesced.iter().position(|c| {
            c.name.eq_ignore_ascii_case(name) && c.members.iter().all(|&(r, _)| r < visible)
        })
    }

    /// True if `(relation, position)` was merged into a coalesced column
    pub fn is_coalesced_member(&self, relation: usize, position: usize) -> bool {
        self.coalesced
            .iter()
            .any(|c| c.members.contains(&(relation, position)))
    }

    /// Output column names in order
    pub fn slot_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }
}

/// Owner of every scope built for one query
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty scope
    ///
    /// The new scope sees only the relations `parent` has bound so far, so
    /// a LATERAL subquery cannot refer to itself or to later joins.
    pub fn alloc(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let parent_visible = parent.map_or(0, |p| self.get(p).relations.len());
        self.scopes.push(Scope {
            id,
            parent,
            parent_visible,
            kind,
            relations: Vec::new(),
            coalesced: Vec::new(),
            slots: Vec::new(),
            filter: None,
        });
        id
    }

    /// Ids are only handed out by [`alloc`](Self::alloc), so lookups cannot miss.
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// `id` followed by its enclosing scopes, innermost first, each paired
    /// with how many of its relations a reference from `id` can see
    pub fn visible_ancestry(&self, id: ScopeId) -> impl Iterator<Item = (&Scope, usize)> + '_ {
        let start = self.get(id);
        std::iter::successors(Some((start, start.relations.len())), move |(s, _)| {
            s.parent.map(|p| (self.get(p), s.parent_visible))
        })
    }
}

/// Output slots currently being walked, innermost last.
///
/// Re-entering a slot already on the stack means the scope graph loops
/// back on itself.
#[derive(Debug, Default)]
pub(crate) struct SlotStack(RefCell<Vec<(ScopeId, usize)>>);

impl SlotStack {
    pub(crate) fn enter(&self, scope: ScopeId, position: usize) -> LineageResult<()> {
        let mut stack = self.0.borrow_mut();
        if stack.contains(&(scope, position)) {
            return Err(LineageError::unsupported(format!(
                "output column {} of {:?} depends on itself",
                position + 1,
                scope
            )));
        }
        stack.push((scope, position));
        Ok(())
    }

    pub(crate) fn leave(&self) {
        self.0.borrow_mut().pop();
    }
}

#[cfg(test)]
#[path = "scope_test.rs"]
mod tests;
