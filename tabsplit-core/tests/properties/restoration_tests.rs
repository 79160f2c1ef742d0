//! Property tests for saving and restoring editor layouts

use std::collections::HashSet;

use proptest::prelude::*;
use tabsplit_core::document::DocumentLocator;
use tabsplit_core::session::{
    RestorationState, deserialize, repair_dangling_references, restore::restore, serialize,
};
use tabsplit_core::split::EditorSplitTree;

use super::layout_ops::{DOCUMENT_POOL, build_tree, document, layout_ops_strategy};

fn identity(locator: &DocumentLocator) -> Option<DocumentLocator> {
    Some(locator.clone())
}

/// Strategy for choosing which pool documents have disappeared
fn missing_strategy() -> impl Strategy<Value = HashSet<DocumentLocator>> {
    proptest::collection::vec(any::<bool>(), DOCUMENT_POOL).prop_map(|flags| {
        flags
            .into_iter()
            .enumerate()
            .filter(|(_, missing)| *missing)
            .map(|(index, _)| document(index))
            .collect()
    })
}

fn decoded(tree: &EditorSplitTree<DocumentLocator>) -> EditorSplitTree<DocumentLocator> {
    let focus = tree.editor_ids()[0];
    let bytes = serialize(tree, focus).unwrap();
    deserialize(&bytes).unwrap().groups
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Saving then restoring with every document still present gives back
    /// the same layout and focus.
    #[test]
    fn prop_round_trip_law(
        ops in layout_ops_strategy(40),
        focus in any::<usize>(),
    ) {
        let tree = build_tree(&ops);
        let ids = tree.editor_ids();
        let focus = ids[focus % ids.len()];

        let bytes = serialize(&tree, focus).unwrap();
        let state: RestorationState = restore(&bytes, &identity, true).unwrap();

        prop_assert!(state.groups.is_well_formed());
        prop_assert_eq!(state.focus, focus);
        prop_assert_eq!(state.groups, tree);
    }

    /// Without pruning, repair keeps every editor and drops exactly the
    /// unresolved documents.
    #[test]
    fn prop_repair_drops_exactly_unresolved(
        ops in layout_ops_strategy(40),
        missing in missing_strategy(),
    ) {
        let tree = build_tree(&ops);
        let resolver = |locator: &DocumentLocator| {
            (!missing.contains(locator)).then(|| locator.clone())
        };

        let repaired: EditorSplitTree<DocumentLocator> =
            repair_dangling_references(decoded(&tree), &resolver, false);

        prop_assert_eq!(repaired.editor_ids(), tree.editor_ids());
        for original in tree.editors() {
            let editor = repaired.editor(original.id()).unwrap();
            let expected: Vec<DocumentLocator> = original
                .tabs()
                .iter()
                .filter(|tab| !missing.contains(*tab))
                .cloned()
                .collect();
            prop_assert_eq!(editor.tabs(), expected.as_slice());

            match original.selected_tab() {
                Some(selected) if !missing.contains(selected) => {
                    prop_assert_eq!(editor.selected_tab(), Some(selected));
                }
                Some(_) => {
                    prop_assert_eq!(editor.selected_tab().is_some(), !expected.is_empty());
                }
                None => prop_assert!(editor.selected_tab().is_none()),
            }
        }
        prop_assert!(repaired.selections_valid());
    }

    /// With pruning, exactly the editors that lost all their documents go
    /// away, and the open set shrinks by the missing documents.
    #[test]
    fn prop_repair_prunes_emptied_editors(
        ops in layout_ops_strategy(40),
        missing in missing_strategy(),
    ) {
        let tree = build_tree(&ops);
        let resolver = |locator: &DocumentLocator| {
            (!missing.contains(locator)).then(|| locator.clone())
        };

        let repaired: EditorSplitTree<DocumentLocator> =
            repair_dangling_references(decoded(&tree), &resolver, true);

        prop_assert!(repaired.is_well_formed());
        let survivors: Vec<_> = tree
            .editors()
            .into_iter()
            .filter(|editor| {
                editor.is_empty() || editor.tabs().iter().any(|tab| !missing.contains(tab))
            })
            .map(|editor| editor.id())
            .collect();
        if survivors.is_empty() {
            prop_assert_eq!(repaired.editor_count(), 1);
            prop_assert!(repaired.as_editor().unwrap().is_empty());
        } else {
            prop_assert_eq!(repaired.editor_ids(), survivors);
        }

        let expected: HashSet<_> = tree
            .collect_open_documents()
            .into_iter()
            .filter(|doc| !missing.contains(doc))
            .collect();
        prop_assert_eq!(repaired.collect_open_documents(), expected);
    }

    /// Decoding arbitrary bytes never panics; anything accepted is well formed
    #[test]
    fn prop_decoding_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        match deserialize(&bytes) {
            Ok(state) => prop_assert!(state.groups.is_well_formed()),
            Err(e) => prop_assert!(e.is_corrupt()),
        }
    }

    /// Truncating a valid encoding is reported as corruption
    #[test]
    fn prop_truncated_encoding_is_corrupt(
        ops in layout_ops_strategy(20),
        cut in any::<prop::sample::Index>(),
    ) {
        let tree = build_tree(&ops);
        let bytes = serialize(&tree, tree.editor_ids()[0]).unwrap();
        let cut = cut.index(bytes.len());

        let err = deserialize(&bytes[..cut]).unwrap_err();
        prop_assert!(err.is_corrupt());
    }
}
