//! Editor panes
//!
//! An [`Editor`] is the leaf of the split tree: an ordered, duplicate-free
//! list of open documents with at most one selected.

use super::types::{ContainerId, EditorId};

/// One pane of tabs.
///
/// # Invariants
///
/// - `tabs` never contains two equal documents.
/// - `selected_tab`, when set, is always an element of `tabs`.
///
/// Equality compares identity, tabs and selection. The parent
/// back-reference is runtime bookkeeping and does not take part.
#[derive(Debug, Clone)]
pub struct Editor<D> {
    id: EditorId,
    tabs: Vec<D>,
    selected_tab: Option<D>,
    parent: Option<ContainerId>,
}

impl<D> Editor<D> {
    /// Creates a new empty editor with a unique ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(EditorId::new())
    }

    /// Creates a new empty editor with the given ID.
    #[must_use]
    pub const fn with_id(id: EditorId) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            selected_tab: None,
            parent: None,
        }
    }

    /// Returns the editor's ID.
    #[must_use]
    pub const fn id(&self) -> EditorId {
        self.id
    }

    /// Returns the open documents in tab order.
    #[must_use]
    pub fn tabs(&self) -> &[D] {
        &self.tabs
    }

    /// Returns the selected document, if any.
    #[must_use]
    pub const fn selected_tab(&self) -> Option<&D> {
        self.selected_tab.as_ref()
    }

    /// Returns the container that holds this editor.
    ///
    /// `None` for the root editor of a tree with no splits.
    #[must_use]
    pub const fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ContainerId>) {
        self.parent = parent;
    }

    /// Returns the number of open tabs.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Returns true if the editor has no open tabs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Splits the editor into its ID, tabs and selection.
    #[must_use]
    pub fn into_parts(self) -> (EditorId, Vec<D>, Option<D>) {
        (self.id, self.tabs, self.selected_tab)
    }
}

impl<D: Clone + PartialEq> Editor<D> {
    /// Builds an editor from restored parts.
    ///
    /// Duplicate tabs are collapsed (the first occurrence keeps its
    /// position) and a selection that is not one of the tabs is dropped.
    #[must_use]
    pub fn from_parts(
        id: EditorId,
        tabs: impl IntoIterator<Item = D>,
        selected_tab: Option<D>,
    ) -> Self {
        let mut unique: Vec<D> = Vec::new();
        for tab in tabs {
            if !unique.contains(&tab) {
                unique.push(tab);
            }
        }
        let selected_tab = selected_tab.filter(|selected| unique.contains(selected));
        Self {
            id,
            tabs: unique,
            selected_tab,
            parent: None,
        }
    }

    /// Returns true if `document` is open in this editor.
    #[must_use]
    pub fn contains(&self, document: &D) -> bool {
        self.tabs.contains(document)
    }

    /// Opens `document` and selects it.
    ///
    /// A document that is already open keeps its position.
    pub fn open_tab(&mut self, document: D) {
        if !self.tabs.contains(&document) {
            self.tabs.push(document.clone());
        }
        self.selected_tab = Some(document);
    }

    /// Closes `document`.
    ///
    /// If it was selected, the selection moves to the tab on its right,
    /// then to the tab on its left, then to nothing.
    ///
    /// Returns true if the document was open.
    pub fn close_tab(&mut self, document: &D) -> bool {
        let Some(index) = self.tabs.iter().position(|tab| tab == document) else {
            return false;
        };
        self.tabs.remove(index);

        if self.selected_tab.as_ref() == Some(document) {
            self.selected_tab = self
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|left| self.tabs.get(left)))
                .cloned();
        }
        true
    }

    /// Selects `document` if it is open.
    ///
    /// Returns false, without changing anything, if it is not.
    pub fn select_tab(&mut self, document: &D) -> bool {
        if self.tabs.contains(document) {
            self.selected_tab = Some(document.clone());
            true
        } else {
            false
        }
    }
}

impl<D> Default for Editor<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PartialEq> PartialEq for Editor<D> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tabs == other.tabs && self.selected_tab == other.selected_tab
    }
}

impl<D: Eq> Eq for Editor<D> {}
