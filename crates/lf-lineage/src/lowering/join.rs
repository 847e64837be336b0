//! Join lowering: predicate joins and USING/NATURAL column coalescing

use super::ScopeBuilder;
use crate::error::{LineageError, LineageResult};
use crate::scope::{CoalescedColumn, JoinKind, Location, ScopeId};
use lf_sql::object_name_last_ident;
use sqlparser::ast::{Join, JoinConstraint, JoinOperator};

impl ScopeBuilder<'_> {
    /// Bind the right-hand relation of a JOIN and record its join kind.
    ///
    /// ON conditions are never lowered: they filter rows and contribute no
    /// lineage.
    pub(super) fn bind_join(&mut self, join: &Join, scope: ScopeId) -> LineageResult<()> {
        let constraint = match &join.join_operator {
            JoinOperator::Join(constraint)
            | JoinOperator::Inner(constraint)
            | JoinOperator::Left(constraint)
            | JoinOperator::LeftOuter(constraint)
            | JoinOperator::Right(constraint)
            | JoinOperator::RightOuter(constraint)
            | JoinOperator::FullOuter(constraint) => Some(constraint),
            JoinOperator::CrossJoin(_) => None,
            other => {
                log::warn!(
                    "Unrecognized join operator {:?}, treating as a predicate join",
                    other
                );
                None
            }
        };

        let left_count = self.arena.get(scope).relations.len();
        self.bind_table_factor(&join.relation, scope, Some(JoinKind::Predicate))?;

        let columns: Vec<(String, Location)> = match constraint {
            Some(JoinConstraint::Using(names)) => names
                .iter()
                .filter_map(object_name_last_ident)
                .map(|ident| (ident.value.clone(), Location::of(ident)))
                .collect(),
            Some(JoinConstraint::Natural) => self.natural_columns(scope, left_count),
            _ => return Ok(()),
        };
        if columns.is_empty() {
            return Ok(());
        }

        for (name, location) in &columns {
            self.coalesce(scope, left_count, name, *location)?;
        }

        let joined = &mut self.arena.get_mut(scope).relations[left_count];
        joined.join = Some(JoinKind::Coalescing {
            columns: columns.into_iter().map(|(name, _)| name).collect(),
        });
        Ok(())
    }

    /// Column names exposed by the right side that the left side also has
    fn natural_columns(&self, scope: ScopeId, left_count: usize) -> Vec<(String, Location)> {
        let scope = self.arena.get(scope);
        let (left, right) = scope.relations.split_at(left_count);

        let mut names: Vec<(String, Location)> = Vec::new();
        for column in right.iter().flat_map(|r| r.columns.iter()) {
            let on_left = scope.find_coalesced(column).is_some()
                || left.iter().any(|r| r.position_of(column).is_some());
            let seen = names.iter().any(|(n, _)| n.eq_ignore_ascii_case(column));
            if on_left && !seen {
                names.push((column.clone(), Location::default()));
            }
        }
        names
    }

    /// Merge `name` from the newly joined relations into one logical column.
    ///
    /// The right side must expose the column exactly once. On the left it
    /// either extends an existing coalesced column (chained USING joins) or
    /// must come from exactly one relation.
    fn coalesce(
        &mut self,
        scope: ScopeId,
        left_count: usize,
        name: &str,
        location: Location,
    ) -> LineageResult<()> {
        let current = self.arena.get(scope);

        let right: Vec<(usize, usize)> = current
            .relations
            .iter()
            .enumerate()
            .skip(left_count)
            .filter_map(|(i, r)| r.position_of(name).map(|p| (i, p)))
            .collect();
        let right = match right.as_slice() {
            [only] => *only,
            [] => return Err(LineageError::unknown_column(name, location)),
            _ => return Err(LineageError::ambiguous(name, location)),
        };

        if let Some(index) = current.find_coalesced(name) {
            self.arena.get_mut(scope).coalesced[index]
                .members
                .push(right);
            return Ok(());
        }

        let left: Vec<(usize, usize)> = current.relations[..left_count]
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.position_of(name).map(|p| (i, p)))
            .collect();
        let left = match left.as_slice() {
            [only] => *only,
            [] => return Err(LineageError::unknown_column(name, location)),
            _ => return Err(LineageError::ambiguous(name, location)),
        };

        let display = current.relations[left.0].columns[left.1].clone();
        log::debug!("{:?}: coalesce '{}' from {:?} and {:?}", scope, display, left, right);
        self.arena.get_mut(scope).coalesced.push(CoalescedColumn {
            name: display,
            members: vec![left, right],
        });
        Ok(())
    }
}
