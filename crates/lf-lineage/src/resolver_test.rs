use super::*;
use crate::lowering::ScopeBuilder;
use crate::scope::{OutputSlot, ScalarExpr, SlotSource};
use lf_core::Schema;
use lf_sql::SqlParser;

fn schema() -> Schema {
    Schema::new()
        .with_table("employees", [("id", "str"), ("name", "str"), ("dept", "str")])
        .with_table("salaries", [("id", "str"), ("salary", "float64")])
        .with_table("raw.orders", [("order_id", "str"), ("id", "str")])
}

fn build(sql: &str) -> (ScopeArena, ScopeId) {
    let parser = SqlParser::bigquery();
    let stmt = parser.parse(sql).unwrap().remove(0);
    let schema = schema();
    ScopeBuilder::new(&schema, parser.dialect())
        .build(&stmt)
        .unwrap()
}

/// Qualifier/name/location of the column in a root slot
fn column_at(arena: &ScopeArena, scope: ScopeId, slot: usize) -> (Option<String>, String, Location) {
    match &arena.get(scope).slots[slot] {
        OutputSlot {
            source:
                SlotSource::Expr(ScalarExpr::Column {
                    qualifier,
                    name,
                    location,
                }),
            ..
        } => (qualifier.clone(), name.clone(), *location),
        other => panic!("expected a column slot, got {:?}", other),
    }
}

fn resolve_slot(arena: &ScopeArena, scope: ScopeId, slot: usize) -> LineageResult<ColumnTarget> {
    let (qualifier, name, location) = column_at(arena, scope, slot);
    resolve_column(arena, scope, qualifier.as_deref(), &name, location)
}

#[test]
fn test_qualified_column_by_alias() {
    let (arena, root) = build("SELECT e.name FROM employees e");
    assert_eq!(
        resolve_slot(&arena, root, 0).unwrap(),
        ColumnTarget::Relation {
            scope: root,
            relation: 0,
            position: 1
        }
    );
}

#[test]
fn test_alias_hides_table_name() {
    let (arena, root) = build("SELECT employees.name FROM employees e");
    let err = resolve_slot(&arena, root, 0).unwrap_err();
    assert!(matches!(err, LineageError::UnknownRelation { ref name, .. } if name == "employees"));
}

#[test]
fn test_qualified_name_and_last_segment() {
    let (arena, root) = build("SELECT orders.order_id, raw.orders.id FROM raw.orders");
    assert!(matches!(
        resolve_slot(&arena, root, 0).unwrap(),
        ColumnTarget::Relation { position: 0, .. }
    ));
    assert!(matches!(
        resolve_slot(&arena, root, 1).unwrap(),
        ColumnTarget::Relation { position: 1, .. }
    ));
}

#[test]
fn test_qualified_unknown_column() {
    let (arena, root) = build("SELECT e.salary FROM employees e");
    let err = resolve_slot(&arena, root, 0).unwrap_err();
    assert!(matches!(err, LineageError::UnknownColumn { ref name, .. } if name == "e.salary"));
}

#[test]
fn test_bare_column_unique_relation() {
    let (arena, root) = build("SELECT salary FROM employees e JOIN salaries s ON e.id = s.id");
    assert_eq!(
        resolve_slot(&arena, root, 0).unwrap(),
        ColumnTarget::Relation {
            scope: root,
            relation: 1,
            position: 1
        }
    );
}

#[test]
fn test_bare_column_ambiguous() {
    let (arena, root) = build("SELECT id FROM employees e JOIN salaries s ON e.id = s.id");
    let err = resolve_slot(&arena, root, 0).unwrap_err();
    assert!(matches!(err, LineageError::AmbiguousAlias { ref name, .. } if name == "id"));
}

#[test]
fn test_coalesced_column_wins() {
    let (arena, root) = build("SELECT id FROM employees JOIN salaries USING (id)");
    assert_eq!(
        resolve_slot(&arena, root, 0).unwrap(),
        ColumnTarget::Coalesced {
            scope: root,
            index: 0
        }
    );
}

#[test]
fn test_correlated_reference_reaches_parent() {
    let (arena, root) = build(
        "SELECT (SELECT MAX(s.salary) FROM salaries s WHERE s.id = e.id) AS top FROM employees e",
    );
    let SlotSource::Expr(ScalarExpr::Subquery(child)) = &arena.get(root).slots[0].source else {
        panic!("expected a subquery slot");
    };
    let (owner, relation) = resolve_relation(&arena, *child, "e", Location::default()).unwrap();
    assert_eq!(owner, root);
    assert_eq!(relation, 0);

    let target = resolve_column(&arena, *child, None, "dept", Location::default()).unwrap();
    assert_eq!(
        target,
        ColumnTarget::Relation {
            scope: root,
            relation: 0,
            position: 2
        }
    );
}

#[test]
fn test_inner_scope_shadows_parent() {
    let (arena, root) = build(
        "SELECT (SELECT MAX(id) FROM salaries) AS top FROM employees",
    );
    let SlotSource::Expr(ScalarExpr::Subquery(child)) = &arena.get(root).slots[0].source else {
        panic!("expected a subquery slot");
    };
    let target = resolve_column(&arena, *child, None, "id", Location::default()).unwrap();
    assert!(matches!(target, ColumnTarget::Relation { scope, .. } if scope == *child));
}

#[test]
fn test_unknown_column_reports_location() {
    let (arena, root) = build("SELECT\n  missing FROM employees");
    let err = resolve_slot(&arena, root, 0).unwrap_err();
    assert_eq!(
        err,
        LineageError::UnknownColumn {
            name: "missing".to_string(),
            line: 2,
            column: 3
        }
    );
}

#[test]
fn test_unknown_relation_qualifier() {
    let (arena, root) = build("SELECT x.id FROM employees");
    let err = resolve_slot(&arena, root, 0).unwrap_err();
    assert!(matches!(err, LineageError::UnknownRelation { .. }));
}
