//! Relation and column resolution within the scope graph

use crate::error::{LineageError, LineageResult};
use crate::scope::{Location, ScopeArena, ScopeId};

/// What a column reference resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTarget {
    /// Column `position` of relation `relation` in `scope`
    Relation {
        scope: ScopeId,
        relation: usize,
        position: usize,
    },
    /// A USING/NATURAL column of `scope`
    Coalesced { scope: ScopeId, index: usize },
}

/// Resolve a relation qualifier, searching enclosing scopes when the
/// current one has no match. An enclosing scope only offers the relations
/// bound before the inner scope was built.
pub fn resolve_relation(
    arena: &ScopeArena,
    scope: ScopeId,
    qualifier: &str,
    location: Location,
) -> LineageResult<(ScopeId, usize)> {
    for (current, visible) in arena.visible_ancestry(scope) {
        if let Some(relation) = current.find_visible_relation(qualifier, location, visible)? {
            return Ok((current.id, relation));
        }
    }
    Err(LineageError::unknown_relation(qualifier, location))
}

/// Resolve a (possibly qualified) column reference.
///
/// A bare name is looked up in each scope from the innermost outwards:
/// coalesced join columns first, then the single relation exposing it.
pub fn resolve_column(
    arena: &ScopeArena,
    scope: ScopeId,
    qualifier: Option<&str>,
    name: &str,
    location: Location,
) -> LineageResult<ColumnTarget> {
    if let Some(qualifier) = qualifier {
        let (owner, relation) = resolve_relation(arena, scope, qualifier, location)?;
        let binding = &arena.get(owner).relations[relation];
        return match binding.position_of(name) {
            Some(position) => Ok(ColumnTarget::Relation {
                scope: owner,
                relation,
                position,
            }),
            None => Err(LineageError::unknown_column(
                format!("{}.{}", qualifier, name),
                location,
            )),
        };
    }

    for (current, visible) in arena.visible_ancestry(scope) {
        if let Some(index) = current.find_visible_coalesced(name, visible) {
            return Ok(ColumnTarget::Coalesced {
                scope: current.id,
                index,
            });
        }

        let mut found = current.relations[..visible]
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.position_of(name).map(|p| (i, p)));
        match (found.next(), found.next()) {
            (Some((relation, position)), None) => {
                return Ok(ColumnTarget::Relation {
                    scope: current.id,
                    relation,
                    position,
                })
            }
            (Some(_), Some(_)) => return Err(LineageError::ambiguous(name, location)),
            (None, _) => {}
        }
    }

    Err(LineageError::unknown_column(name, location))
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
