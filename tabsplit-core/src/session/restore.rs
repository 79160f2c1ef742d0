//! Session restoration codec
//!
//! Converts a split tree and its focused editor to and from the persisted
//! JSON form stored under [`OPEN_TABS_KEY`], and repairs decoded trees whose
//! documents no longer exist.
//!
//! The persisted form mirrors the tree depth-first:
//!
//! ```json
//! {
//!   "focus": "9b2c...",
//!   "groups": {
//!     "type": "horizontal",
//!     "tabs": [
//!       { "type": "one", "tabs": { "tabs": ["/a.rs"], "selectedTab": "/a.rs", "id": "1f0e..." } },
//!       { "type": "vertical", "tabs": [ ... ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Container IDs and parent references are runtime bookkeeping and are
//! never written.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::store::StoreError;
use crate::document::{Document, DocumentLocator, DocumentResolver};
use crate::split::{Axis, Editor, EditorId, EditorSplitTree, SplitContainer};
use crate::tracing::span_names;

/// Workspace state key holding the saved layout.
pub const OPEN_TABS_KEY: &str = "openTabs";

/// Errors that can occur while saving or restoring a session.
#[derive(Debug, thiserror::Error)]
pub enum RestorationError {
    /// The saved bytes do not describe a layout
    #[error("corrupt restoration state: {0}")]
    CorruptRestorationState(#[source] serde_json::Error),

    /// The same editor ID appears more than once in the saved layout
    #[error("corrupt restoration state: duplicate editor {0}")]
    DuplicateEditor(EditorId),

    /// The layout could not be encoded
    #[error("failed to serialize restoration state: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The workspace state store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RestorationError {
    /// Returns true if the saved state itself is unusable, as opposed to a
    /// failure of the store or the encoder.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::CorruptRestorationState(_) | Self::DuplicateEditor(_)
        )
    }
}

/// A decoded layout together with the editor that had focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorationState<D = DocumentLocator> {
    /// The focused editor.
    pub focus: EditorId,
    /// The editor layout.
    pub groups: EditorSplitTree<D>,
}

#[derive(Serialize, Deserialize)]
struct RestorationRecord {
    focus: EditorId,
    groups: SplitRecord,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "tabs", rename_all = "lowercase")]
enum SplitRecord {
    One(EditorRecord),
    Vertical(Vec<SplitRecord>),
    Horizontal(Vec<SplitRecord>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditorRecord {
    tabs: Vec<DocumentLocator>,
    #[serde(default)]
    selected_tab: Option<DocumentLocator>,
    id: EditorId,
}

fn record_for<D: Document>(node: &EditorSplitTree<D>) -> SplitRecord {
    match node {
        EditorSplitTree::Single(editor) => SplitRecord::One(EditorRecord {
            tabs: editor.tabs().iter().map(Document::locator).collect(),
            selected_tab: editor.selected_tab().map(Document::locator),
            id: editor.id(),
        }),
        EditorSplitTree::Container(container) => {
            let children = container.children().iter().map(record_for).collect();
            match container.axis() {
                Axis::Vertical => SplitRecord::Vertical(children),
                Axis::Horizontal => SplitRecord::Horizontal(children),
            }
        }
    }
}

fn tree_from_record(
    record: SplitRecord,
    seen: &mut HashSet<EditorId>,
) -> Result<EditorSplitTree<DocumentLocator>, RestorationError> {
    let (axis, children) = match record {
        SplitRecord::One(editor) => {
            if !seen.insert(editor.id) {
                return Err(RestorationError::DuplicateEditor(editor.id));
            }
            return Ok(EditorSplitTree::Single(Editor::from_parts(
                editor.id,
                editor.tabs,
                editor.selected_tab,
            )));
        }
        SplitRecord::Vertical(children) => (Axis::Vertical, children),
        SplitRecord::Horizontal(children) => (Axis::Horizontal, children),
    };

    let children = children
        .into_iter()
        .map(|child| tree_from_record(child, seen))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EditorSplitTree::Container(SplitContainer::with_children(
        axis, children,
    )))
}

/// Encodes `tree` and the focused editor.
///
/// # Errors
///
/// Returns `RestorationError::Serialization` if encoding fails.
pub fn serialize<D: Document>(
    tree: &EditorSplitTree<D>,
    focus: EditorId,
) -> Result<Vec<u8>, RestorationError> {
    let record = RestorationRecord {
        focus,
        groups: record_for(tree),
    };
    serde_json::to_vec(&record).map_err(RestorationError::Serialization)
}

/// Decodes a saved layout.
///
/// Editors are cleaned up on the way in (duplicate tabs collapse, a
/// selection that is not a tab is cleared) and containers with fewer than
/// two children are flattened. Documents are not resolved; see
/// [`repair_dangling_references`].
///
/// # Errors
///
/// Returns `RestorationError::CorruptRestorationState` if the bytes do not
/// match the layout schema and `RestorationError::DuplicateEditor` if an
/// editor ID is repeated.
pub fn deserialize(bytes: &[u8]) -> Result<RestorationState, RestorationError> {
    let record: RestorationRecord = serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!(error = %e, "Saved layout does not match the restoration schema");
        RestorationError::CorruptRestorationState(e)
    })?;

    let mut seen = HashSet::new();
    let mut groups = tree_from_record(record.groups, &mut seen).inspect_err(|e| {
        tracing::warn!(error = %e, "Saved layout is inconsistent");
    })?;
    groups.normalize();

    Ok(RestorationState {
        focus: record.focus,
        groups,
    })
}

/// Resolves every locator in `tree` into a live document.
///
/// Locators the resolver rejects are dropped. If an editor's selected
/// document is dropped, the nearest surviving tab to its right is selected,
/// then the nearest to its left. When `prune_emptied` is set, an editor
/// that had tabs and lost all of them is removed; a tree left with no
/// editors becomes a single fresh editor.
pub fn repair_dangling_references<D, R>(
    tree: EditorSplitTree<DocumentLocator>,
    resolver: &R,
    prune_emptied: bool,
) -> EditorSplitTree<D>
where
    D: Document,
    R: DocumentResolver<D> + ?Sized,
{
    let _span = crate::trace_operation_debug!(
        span_names::SESSION_REPAIR,
        editor_count = tree.editor_count()
    )
    .entered();

    let repaired = tree.filter_map_editors(&mut |editor: Editor<DocumentLocator>| {
        let (id, tabs, selected) = editor.into_parts();
        let selected_index = selected
            .as_ref()
            .and_then(|selected| tabs.iter().position(|tab| tab == selected));

        let resolved: Vec<Option<D>> = tabs
            .iter()
            .map(|locator| {
                let document = resolver.resolve(locator);
                if document.is_none() {
                    tracing::debug!(editor_id = %id, %locator, "Dropped unresolved document");
                }
                document
            })
            .collect();

        let selection = selected_index.and_then(|index| {
            resolved[index]
                .clone()
                .or_else(|| resolved[index + 1..].iter().flatten().next().cloned())
                .or_else(|| resolved[..index].iter().rev().flatten().next().cloned())
        });

        let repaired = Editor::from_parts(id, resolved.into_iter().flatten(), selection);
        if prune_emptied && !tabs.is_empty() && repaired.is_empty() {
            tracing::debug!(editor_id = %id, "Pruned editor with no remaining documents");
            return None;
        }
        Some(repaired)
    });

    let mut repaired = repaired.unwrap_or_else(EditorSplitTree::new_single);
    repaired.normalize();
    repaired
}

/// Decodes and repairs a saved layout, ready to be installed.
///
/// The saved focus is kept if its editor survived repair; otherwise focus
/// falls back to the first editor in depth-first order.
///
/// # Errors
///
/// Returns the decoding errors of [`deserialize`].
pub fn restore<D, R>(
    bytes: &[u8],
    resolver: &R,
    prune_emptied: bool,
) -> Result<RestorationState<D>, RestorationError>
where
    D: Document,
    R: DocumentResolver<D> + ?Sized,
{
    let _span = crate::trace_operation!(span_names::SESSION_RESTORE, bytes = bytes.len()).entered();

    let decoded = deserialize(bytes)?;
    let groups = repair_dangling_references(decoded.groups, resolver, prune_emptied);
    let focus = groups
        .editor(decoded.focus)
        .or_else(|| groups.find_some_editor(None))
        .map_or(decoded.focus, Editor::id);

    if focus != decoded.focus {
        tracing::debug!(
            saved = %decoded.focus,
            editor_id = %focus,
            "Saved focus did not survive repair"
        );
    }
    tracing::info!(
        editor_count = groups.editor_count(),
        "Restored editor layout"
    );

    Ok(RestorationState { focus, groups })
}
