use super::*;

fn table(name: &str, alias: Option<&str>, columns: &[&str]) -> RelationBinding {
    RelationBinding {
        name: name.to_string(),
        alias: alias.map(str::to_string),
        target: RelationTarget::Table(name.to_string()),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        join: None,
    }
}

#[test]
fn test_aliased_relation_hides_table_name() {
    let binding = table("employees", Some("e1"), &["id"]);
    assert!(binding.answers_to("e1"));
    assert!(binding.answers_to("E1"));
    assert!(!binding.answers_to("employees"));
}

#[test]
fn test_unaliased_relation_matches_name_and_last_segment() {
    let binding = table("raw.orders", None, &["id"]);
    assert!(binding.answers_to("raw.orders"));
    assert!(binding.answers_to("orders"));
    assert!(binding.answers_to("ORDERS"));
    assert!(!binding.answers_to("customers"));
}

#[test]
fn test_anonymous_subquery_never_matches() {
    let binding = RelationBinding {
        name: String::new(),
        alias: None,
        target: RelationTarget::Scope(ScopeId(1)),
        columns: vec!["a".to_string()],
        join: None,
    };
    assert!(!binding.answers_to(""));
    assert!(!binding.answers_to("a"));
}

#[test]
fn test_position_of_is_case_insensitive() {
    let binding = table("t", None, &["a", "B", "c"]);
    assert_eq!(binding.position_of("b"), Some(1));
    assert_eq!(binding.position_of("C"), Some(2));
    assert_eq!(binding.position_of("d"), None);
}

#[test]
fn test_find_relation_reports_ambiguity() {
    let mut arena = ScopeArena::new();
    let id = arena.alloc(None, ScopeKind::Select);
    let scope = arena.get_mut(id);
    scope.relations.push(table("employees", None, &["id"]));
    scope.relations.push(table("employees", None, &["id"]));
    scope.relations.push(table("employees", Some("e2"), &["id"]));

    let scope = arena.get(id);
    assert_eq!(scope.find_relation("e2", Location::default()), Ok(Some(2)));
    assert_eq!(scope.find_relation("missing", Location::default()), Ok(None));
    assert!(matches!(
        scope.find_relation("employees", Location { line: 3, column: 7 }),
        Err(LineageError::AmbiguousAlias { line: 3, column: 7, .. })
    ));
}

#[test]
fn test_coalesced_membership() {
    let mut arena = ScopeArena::new();
    let id = arena.alloc(None, ScopeKind::Select);
    arena.get_mut(id).coalesced.push(CoalescedColumn {
        name: "a".to_string(),
        members: vec![(0, 0), (1, 0)],
    });
    let scope = arena.get(id);
    assert_eq!(scope.find_coalesced("A"), Some(0));
    assert!(scope.is_coalesced_member(1, 0));
    assert!(!scope.is_coalesced_member(1, 1));
}

#[test]
fn test_ancestry_walks_to_root() {
    let mut arena = ScopeArena::new();
    let root = arena.alloc(None, ScopeKind::Select);
    let child = arena.alloc(Some(root), ScopeKind::Select);
    let grandchild = arena.alloc(Some(child), ScopeKind::Select);

    let chain: Vec<ScopeId> = arena.visible_ancestry(grandchild).map(|(s, _)| s.id).collect();
    assert_eq!(chain, vec![grandchild, child, root]);
    assert_eq!(arena.len(), 3);
}

#[test]
fn test_child_sees_only_relations_bound_before_it() {
    let mut arena = ScopeArena::new();
    let root = arena.alloc(None, ScopeKind::Select);
    arena.get_mut(root).relations.push(table("t", None, &["a"]));
    arena.get_mut(root).coalesced.push(CoalescedColumn {
        name: "a".to_string(),
        members: vec![(0, 0), (1, 0)],
    });
    let lateral = arena.alloc(Some(root), ScopeKind::Select);
    arena.get_mut(root).relations.push(table("u", Some("l"), &["a"]));

    assert_eq!(arena.get(lateral).parent_visible, 1);
    let chain: Vec<(ScopeId, usize)> = arena
        .visible_ancestry(lateral)
        .map(|(s, visible)| (s.id, visible))
        .collect();
    assert_eq!(chain, vec![(lateral, 0), (root, 1)]);

    let parent = arena.get(root);
    assert_eq!(parent.find_visible_relation("l", Location::default(), 1), Ok(None));
    assert_eq!(parent.find_visible_relation("t", Location::default(), 1), Ok(Some(0)));
    assert_eq!(parent.find_visible_coalesced("a", 1), None);
    assert_eq!(parent.find_visible_coalesced("a", 2), Some(0));
}

#[test]
fn test_slot_stack_rejects_reentry() {
    let stack = SlotStack::default();
    stack.enter(ScopeId(0), 0).unwrap();
    stack.enter(ScopeId(1), 0).unwrap();
    assert!(matches!(
        stack.enter(ScopeId(0), 0),
        Err(LineageError::UnsupportedConstruct { .. })
    ));
    stack.leave();
    stack.leave();
    stack.enter(ScopeId(0), 0).unwrap();
}
