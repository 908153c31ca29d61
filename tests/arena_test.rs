//! Tests for the arena index over allocation trees

use splittree::domain::AllocArena;
use splittree::util::testing::{fixed, percent, rest};

#[test]
fn given_tree_when_iterating_then_yields_preorder() {
    let root = rest("root").with_children([
        fixed("a", 1.0).with_children([rest("a1"), rest("a2")]),
        percent("b", 10.0),
    ]);
    let tree = AllocArena::from_root(&root);

    let ids: Vec<&str> = tree.iter().map(|(_, n)| n.id()).collect();

    assert_eq!(ids, vec!["root", "a", "a1", "a2", "b"]);
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn given_tree_when_finding_by_id_then_resolves_parent_links() {
    let root = rest("root").with_child(fixed("a", 1.0).with_child(rest("a1")));
    let tree = AllocArena::from_root(&root);

    let idx = tree.find("a1").expect("a1 indexed");
    let node = tree.get_node(idx).expect("a1 stored");
    let parent = node.parent.and_then(|p| tree.get_node(p)).expect("parent");

    assert_eq!(parent.id(), "a");
    assert_eq!(tree.path_of(idx), vec!["a".to_string()]);
    assert!(tree.find("missing").is_none());
    assert!(tree.duplicate_ids().is_empty());
}

#[test]
fn given_tree_when_collecting_leaves_then_paths_exclude_root() {
    let root = rest("root").with_children([
        rest("a").with_child(rest("b").with_child(rest("c"))),
        rest("d"),
    ]);
    let tree = AllocArena::from_root(&root);

    let leaves = tree.leaves();

    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].node.id, "c");
    assert_eq!(leaves[0].path, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(leaves[1].node.id, "d");
    assert!(leaves[1].path.is_empty());
}
