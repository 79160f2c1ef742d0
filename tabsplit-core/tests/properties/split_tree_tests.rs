//! Property tests for the editor split tree

use std::collections::HashSet;

use proptest::prelude::*;
use tabsplit_core::document::DocumentLocator;
use tabsplit_core::split::{Axis, Edge, Editor, EditorSplitTree};

use super::layout_ops::{apply, build_tree, document, edge_strategy, layout_ops_strategy};

/// Returns true if some container directly holds a container on its own axis
fn has_same_axis_nesting(tree: &EditorSplitTree<DocumentLocator>) -> bool {
    tree.as_container().is_some_and(|container| {
        container.children().iter().any(|child| {
            child
                .as_container()
                .is_some_and(|inner| inner.axis() == container.axis())
                || has_same_axis_nesting(child)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every operation leaves the tree well formed: no container with fewer
    /// than two children, parent references intact, unique editor IDs.
    #[test]
    fn prop_operations_preserve_structure(ops in layout_ops_strategy(40)) {
        let mut tree = EditorSplitTree::new_single();
        for op in &ops {
            apply(&mut tree, op);
            prop_assert!(tree.is_well_formed(), "malformed after {:?}", op);
            prop_assert!(tree.selections_valid(), "selection outside tabs after {:?}", op);
            prop_assert!(tree.editor_count() >= 1);
        }
    }

    /// Nesting only happens where the split direction changes
    #[test]
    fn prop_no_same_axis_nesting(ops in layout_ops_strategy(40)) {
        let mut tree = EditorSplitTree::new_single();
        for op in &ops {
            apply(&mut tree, op);
            prop_assert!(!has_same_axis_nesting(&tree), "same-axis nesting after {:?}", op);
        }
    }

    /// Editors never hold the same document twice
    #[test]
    fn prop_tabs_stay_unique(ops in layout_ops_strategy(40)) {
        let tree = build_tree(&ops);
        for editor in tree.editors() {
            let unique: HashSet<_> = editor.tabs().iter().collect();
            prop_assert_eq!(unique.len(), editor.tab_count());
        }
    }

    /// Splitting adds exactly one editor, next to the target in reading
    /// order and sharing its container.
    #[test]
    fn prop_split_places_new_editor_beside_target(
        ops in layout_ops_strategy(30),
        target in any::<usize>(),
        edge in edge_strategy(),
    ) {
        let mut tree = build_tree(&ops);
        let before = tree.editor_ids();
        let target = before[target % before.len()];
        let new_editor = Editor::new();
        let new_id = new_editor.id();

        tree.split_editor(target, edge, new_editor).unwrap();

        let after = tree.editor_ids();
        prop_assert_eq!(after.len(), before.len() + 1);
        prop_assert_eq!(
            tree.editor(new_id).unwrap().parent(),
            tree.editor(target).unwrap().parent()
        );

        let new_pos = after.iter().position(|id| *id == new_id).unwrap();
        let target_pos = after.iter().position(|id| *id == target).unwrap();
        if edge.places_first() {
            prop_assert_eq!(new_pos + 1, target_pos);
        } else {
            prop_assert_eq!(target_pos + 1, new_pos);
        }
        prop_assert!(tree.is_well_formed());
    }

    /// Closing removes exactly the target and keeps everyone else in order
    #[test]
    fn prop_close_removes_only_target(
        ops in layout_ops_strategy(30),
        target in any::<usize>(),
    ) {
        let mut tree = build_tree(&ops);
        let before = tree.editor_ids();
        let target = before[target % before.len()];

        let closed = tree.close_editor(target).unwrap();

        prop_assert_eq!(closed.id(), target);
        let after = tree.editor_ids();
        prop_assert!(!after.contains(&target));
        if before.len() == 1 {
            prop_assert_eq!(after.len(), 1);
            prop_assert!(tree.as_editor().unwrap().is_empty());
        } else {
            let expected: Vec<_> = before.into_iter().filter(|id| *id != target).collect();
            prop_assert_eq!(after, expected);
        }
        prop_assert!(tree.is_well_formed());
    }

    /// Normalizing a well-formed tree changes nothing
    #[test]
    fn prop_normalize_is_identity_on_well_formed(ops in layout_ops_strategy(40)) {
        let mut tree = build_tree(&ops);
        let before = tree.clone();
        tree.normalize();
        prop_assert_eq!(tree, before);
    }

    /// Closing a document everywhere removes it from the open set only
    #[test]
    fn prop_close_document_everywhere(
        ops in layout_ops_strategy(40),
        index in 0usize..6,
    ) {
        let mut tree = build_tree(&ops);
        let doc = document(index);
        let mut expected = tree.collect_open_documents();
        expected.remove(&doc);
        let editors_before = tree.editor_count();

        tree.close_document_everywhere(&doc);

        prop_assert_eq!(tree.collect_open_documents(), expected);
        prop_assert_eq!(tree.editor_count(), editors_before);
        prop_assert!(tree.selections_valid());
    }
}

// ============================================================================
// Merge vs wrap
// ============================================================================

fn three_across() -> (EditorSplitTree<DocumentLocator>, Vec<Editor<DocumentLocator>>) {
    let editors: Vec<Editor<DocumentLocator>> = (0..3).map(|_| Editor::new()).collect();
    let mut tree = EditorSplitTree::Single(editors[0].clone());
    tree.split_editor(editors[0].id(), Edge::Trailing, editors[1].clone()).unwrap();
    tree.split_editor(editors[1].id(), Edge::Trailing, editors[2].clone()).unwrap();
    (tree, editors)
}

#[test]
fn trailing_split_in_horizontal_container_inserts_after() {
    let (mut tree, editors) = three_across();
    let new_editor = Editor::new();
    let new_id = new_editor.id();

    tree.split_editor(editors[1].id(), Edge::Trailing, new_editor).unwrap();

    let root = tree.as_container().unwrap();
    assert_eq!(root.axis(), Axis::Horizontal);
    assert_eq!(root.len(), 4);
    assert_eq!(root.position_of(new_id), Some(2));
}

#[test]
fn top_split_in_horizontal_container_wraps_target() {
    let (mut tree, editors) = three_across();
    let new_editor = Editor::new();
    let new_id = new_editor.id();

    tree.split_editor(editors[1].id(), Edge::Top, new_editor).unwrap();

    let root = tree.as_container().unwrap();
    assert_eq!(root.len(), 3);
    let wrapped = root.children()[1].as_container().unwrap();
    assert_eq!(wrapped.axis(), Axis::Vertical);
    assert_eq!(wrapped.position_of(new_id), Some(0));
    assert_eq!(wrapped.position_of(editors[1].id()), Some(1));
}

#[test]
fn closing_one_of_two_promotes_survivor_to_root() {
    let a = Editor::<DocumentLocator>::new();
    let b = Editor::new();
    let b_id = b.id();
    let mut tree = EditorSplitTree::Single(a.clone());
    tree.split_editor(a.id(), Edge::Trailing, b).unwrap();

    tree.close_editor(b_id).unwrap();

    let root = tree.as_editor().unwrap();
    assert_eq!(root.id(), a.id());
    assert!(root.parent().is_none());
}

#[test]
fn closing_inside_nested_split_collapses_inner_container() {
    let (mut tree, editors) = three_across();
    let below = Editor::new();
    let below_id = below.id();
    tree.split_editor(editors[1].id(), Edge::Bottom, below).unwrap();
    assert_eq!(tree.depth(), 2);

    tree.close_editor(below_id).unwrap();

    assert_eq!(tree.depth(), 1);
    let root = tree.as_container().unwrap();
    assert_eq!(root.position_of(editors[1].id()), Some(1));
    assert!(tree.is_well_formed());
}
