//! Table reference extraction from SQL AST

use std::collections::{BTreeSet, HashSet};
use std::ops::ControlFlow;

use sqlparser::ast::{ObjectName, Query, Statement, Visit, Visitor};

use crate::object_name_to_string;

/// Collects relation names and the CTE names that shadow them
#[derive(Default)]
struct RelationCollector {
    relations: Vec<String>,
    cte_names: HashSet<String>,
}

impl Visitor for RelationCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.cte_names
                    .insert(cte.alias.name.value.to_ascii_lowercase());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        self.relations.push(object_name_to_string(relation));
        ControlFlow::Continue(())
    }
}

/// Extract every base table referenced by the statements.
///
/// Walks FROM clauses, JOINs, subqueries, CTE bodies and set-operation
/// branches. Qualified names are joined with `.`; names bound by a `WITH`
/// clause are not tables and are left out. The result is deduplicated and
/// sorted.
pub fn extract_tables(statements: &[Statement]) -> Vec<String> {
    let mut collector = RelationCollector::default();
    for stmt in statements {
        let _ = stmt.visit(&mut collector);
    }

    let RelationCollector {
        relations,
        cte_names,
    } = collector;

    relations
        .into_iter()
        .filter(|name| name.contains('.') || !cte_names.contains(&name.to_ascii_lowercase()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
