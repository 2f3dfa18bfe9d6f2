//! Editing scenarios for OutlineTree
//!
//! Tests cover:
//! - Create after / append child slots
//! - Indent and outdent, including the no-op edges
//! - Drag/drop between, above and below siblings
//! - Cycle rejection
//! - Child index staying equal to a fresh rebuild after every edit

use crate::db::{ChildIndex, NodeStore};
use crate::models::{DropPosition, Node, NodeUpdate, HOME_ID, LIMBO_ID};
use crate::tree::{OutlineError, OutlineTree, Placement};

fn positions(tree: &OutlineTree, parent: &str) -> Vec<(String, f64)> {
    tree.children(parent)
        .iter()
        .map(|id| (id.clone(), tree.get(id).unwrap().pos))
        .collect()
}

fn assert_index_fresh(tree: &OutlineTree) {
    assert_eq!(
        tree.index(),
        &ChildIndex::build(tree.store()),
        "incremental index drifted from the store"
    );
}

#[test]
fn test_insert_after_expanded_parent_becomes_first_child() {
    let tree = OutlineTree::from_nodes(vec![
        Node::new("p", HOME_ID, 1.0, "parent"),
        Node::new("c1", "p", 2.0, "child"),
    ]);

    assert_eq!(tree.plan_insert_after("p"), Some(Placement::new("p", 1.0)));
}

#[test]
fn test_insert_after_collapsed_parent_becomes_next_sibling() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("p", HOME_ID, 1.0, "parent"),
        Node::new("c1", "p", 2.0, "child"),
        Node::new("q", HOME_ID, 2.0, "next"),
    ]);
    tree.toggle_collapsed("p");

    assert_eq!(
        tree.plan_insert_after("p"),
        Some(Placement::new(HOME_ID, 1.5))
    );
}

#[test]
fn test_insert_after_last_sibling_steps_past_it() {
    let tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 3.0, ""),
    ]);
    assert_eq!(
        tree.plan_insert_after("b"),
        Some(Placement::new(HOME_ID, 4.0))
    );
    assert_eq!(tree.plan_insert_after("missing"), None);
}

#[test]
fn test_append_child_after_last() {
    let tree = OutlineTree::from_nodes(vec![
        Node::new("p", HOME_ID, 1.0, ""),
        Node::new("c1", "p", 1.0, ""),
        Node::new("c2", "p", 5.0, ""),
    ]);

    assert_eq!(tree.plan_append_child("p"), Some(Placement::new("p", 6.0)));
    assert_eq!(
        tree.plan_append_child(HOME_ID),
        Some(Placement::new(HOME_ID, 2.0))
    );
    assert_eq!(tree.plan_append_child(LIMBO_ID), None);
    assert_eq!(tree.plan_append_child("missing"), None);
}

#[test]
fn test_create_after_and_append_child_insert_records() {
    let mut tree = OutlineTree::from_nodes(vec![Node::new("a", HOME_ID, 1.0, "")]);

    let created = tree.create_after("a", "b", "second").unwrap().unwrap();
    assert_eq!((created.parent_id.as_str(), created.pos), (HOME_ID, 2.0));

    let child = tree.append_child("a", "a1", "nested").unwrap().unwrap();
    assert_eq!((child.parent_id.as_str(), child.pos), ("a", 1.0));

    assert_eq!(tree.create_after("missing", "x", "").unwrap(), None);
    assert_eq!(
        tree.append_child("a", "b", "dup"),
        Err(OutlineError::duplicate_node("b"))
    );
    assert!(tree.is_dirty("b") && tree.is_dirty("a1"));
    assert_index_fresh(&tree);
}

#[test]
fn test_drop_between_siblings_takes_midpoint() {
    let tree = OutlineTree::from_nodes(vec![
        Node::new("s2", HOME_ID, 2.0, ""),
        Node::new("s4", HOME_ID, 4.0, ""),
        Node::new("x", HOME_ID, 10.0, ""),
    ]);

    assert_eq!(
        tree.plan_move("x", "s2", DropPosition::Below),
        Some(Placement::new(HOME_ID, 3.0))
    );
    assert_eq!(
        tree.plan_move("x", "s4", DropPosition::Above),
        Some(Placement::new(HOME_ID, 3.0))
    );
}

#[test]
fn test_drop_at_ends_uses_bounds() {
    let tree = OutlineTree::from_nodes(vec![
        Node::new("s2", HOME_ID, 2.0, ""),
        Node::new("s4", HOME_ID, 4.0, ""),
        Node::new("x", HOME_ID, 10.0, ""),
    ]);

    assert_eq!(
        tree.plan_move("x", "s2", DropPosition::Above),
        Some(Placement::new(HOME_ID, 1.0))
    );
    assert_eq!(
        tree.plan_move("s2", "x", DropPosition::Below),
        Some(Placement::new(HOME_ID, 5005.0))
    );
}

#[test]
fn test_drop_into_other_parent() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("a1", "a", 1.0, ""),
        Node::new("a2", "a", 2.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
    ]);

    let moved = tree.move_via_drag("b", "a1", DropPosition::Below).unwrap();
    assert_eq!((moved.parent_id.as_str(), moved.pos), ("a", 1.5));
    assert_eq!(tree.children("a"), ["a1", "b", "a2"]);
    assert_eq!(tree.children(HOME_ID), ["a"]);
    assert_index_fresh(&tree);
}

#[test]
fn test_noop_requests() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("a1", "a", 1.0, ""),
    ]);

    assert_eq!(tree.plan_indent("a"), None, "first child cannot indent");
    assert_eq!(tree.plan_outdent("a"), None, "root child cannot outdent");
    assert_eq!(tree.plan_move("a", "a", DropPosition::Below), None);
    assert_eq!(tree.plan_indent("missing"), None);

    assert!(tree.indent("a").is_none());
    assert!(tree.outdent("a").is_none());
    assert_eq!(tree.dirty_len(), 0);
}

#[test]
fn test_edits_never_touch_sibling_positions() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
        Node::new("c", HOME_ID, 3.0, ""),
        Node::new("d", HOME_ID, 4.0, ""),
    ]);
    let before = positions(&tree, HOME_ID);

    tree.create_after("b", "new", "").unwrap();
    tree.move_via_drag("d", "a", DropPosition::Below);

    for (id, pos) in before {
        if id != "d" {
            assert_eq!(tree.get(&id).unwrap().pos, pos, "{id} was rewritten");
        }
    }
    let order: Vec<&str> = tree.children(HOME_ID).iter().map(String::as_str).collect();
    assert_eq!(order, vec!["a", "d", "b", "new", "c"]);
}

#[test]
fn test_indent_then_outdent_restores_rank() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
        Node::new("c", HOME_ID, 3.0, ""),
    ]);

    let indented = tree.indent("b").unwrap();
    assert_eq!((indented.parent_id.as_str(), indented.pos), ("a", 1.0));
    assert_eq!(tree.children(HOME_ID), ["a", "c"]);
    assert!(!tree.get("a").unwrap().collapsed);

    let outdented = tree.outdent("b").unwrap();
    assert_eq!((outdented.parent_id.as_str(), outdented.pos), (HOME_ID, 2.0));
    assert_eq!(tree.children(HOME_ID), ["a", "b", "c"]);
    assert_index_fresh(&tree);
}

#[test]
fn test_indent_appends_after_existing_children() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("a1", "a", 1.0, ""),
        Node::new("a2", "a", 7.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
    ]);

    let indented = tree.indent("b").unwrap();
    assert_eq!(indented.pos, 8.0);
    assert_eq!(tree.children("a"), ["a1", "a2", "b"]);
}

#[test]
fn test_outdent_leaves_younger_siblings_behind() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", "a", 1.0, ""),
        Node::new("c", "a", 2.0, ""),
        Node::new("d", HOME_ID, 2.0, ""),
    ]);

    let outdented = tree.outdent("b").unwrap();
    assert_eq!((outdented.parent_id.as_str(), outdented.pos), (HOME_ID, 1.5));
    assert_eq!(tree.children(HOME_ID), ["a", "b", "d"]);
    assert_eq!(tree.children("a"), ["c"]);
}

#[test]
fn test_drop_into_own_subtree_rejected() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("a1", "a", 1.0, ""),
        Node::new("a1x", "a1", 1.0, ""),
    ]);

    assert_eq!(tree.plan_move("a", "a1x", DropPosition::Above), None);
    assert!(tree.move_via_drag("a", "a1", DropPosition::Below).is_none());
    assert_eq!(
        tree.apply_placement("a", Placement::new("a1x", 2.0)),
        Err(OutlineError::cyclic_placement("a", "a1x"))
    );
    assert_eq!(tree.get("a").unwrap().parent_id, HOME_ID);
    assert_eq!(tree.dirty_len(), 0);
}

#[test]
fn test_drop_on_consumes_drag_state() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
        Node::new("c", HOME_ID, 3.0, ""),
    ]);

    assert!(tree.drop_on("a", DropPosition::Above).is_none());

    assert!(tree.begin_drag("c"));
    let moved = tree.drop_on("a", DropPosition::Above).unwrap();
    assert_eq!(moved.pos, 0.5);
    assert_eq!(tree.drag_source(), None);
    assert_eq!(tree.children(HOME_ID), ["c", "a", "b"]);
}

#[test]
fn test_deleting_drag_source_cancels_drag() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
    ]);
    tree.begin_drag("a");
    tree.delete("a");
    assert_eq!(tree.drag_source(), None);
    assert!(tree.drop_on("b", DropPosition::Below).is_none());
}

#[test]
fn test_dragging_deleted_node_restores_it() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
    ]);
    tree.delete("a");

    let restored = tree.move_via_drag("a", "b", DropPosition::Below).unwrap();
    assert_eq!(restored.parent_id, HOME_ID);
    assert!(!restored.is_deleted());
    assert!(tree.children(LIMBO_ID).is_empty());
}

#[test]
fn test_update_repositions_through_index() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("a", HOME_ID, 1.0, ""),
        Node::new("b", HOME_ID, 2.0, ""),
    ]);
    tree.update("b", NodeUpdate::new().with_position(HOME_ID, 0.5))
        .unwrap();
    assert_eq!(tree.children(HOME_ID), ["b", "a"]);
    assert_index_fresh(&tree);
}

#[test]
fn test_index_matches_rebuild_after_mixed_edits() {
    let mut tree = OutlineTree::new();
    tree.append_child(HOME_ID, "a", "").unwrap();
    for i in 0..20 {
        let anchor = if i % 2 == 0 { "a" } else { tree.children(HOME_ID)[0].as_str() };
        let anchor = anchor.to_string();
        tree.create_after(&anchor, format!("n{i}"), "").unwrap();
    }
    tree.indent("n3");
    tree.indent("n5");
    tree.outdent("n3");
    tree.move_via_drag("n7", "n1", DropPosition::Above);
    tree.delete("n9");
    tree.toggle_collapsed("a");
    tree.renormalize();

    assert_index_fresh(&tree);
    assert_eq!(tree.store().len(), 21);
}

#[test]
fn test_repeated_midpoint_inserts_stay_ordered_until_renormalized() {
    let mut tree = OutlineTree::from_nodes(vec![
        Node::new("first", HOME_ID, 1.0, ""),
        Node::new("last", HOME_ID, 2.0, ""),
    ]);

    for i in 0..20 {
        tree.create_after("first", format!("n{i}"), "").unwrap();
    }
    let children = tree.children(HOME_ID).to_vec();
    assert_eq!(children.first().map(String::as_str), Some("first"));
    assert_eq!(children.last().map(String::as_str), Some("last"));
    assert!(!tree.parents_needing_renormalization().is_empty());

    tree.renormalize();
    assert_eq!(tree.children(HOME_ID), children.as_slice());
    assert!(tree.parents_needing_renormalization().is_empty());
}
