//! Editor split tree
//!
//! The layout of a workspace window is a tree whose leaves are editors
//! and whose inner nodes are split containers. Each container lays its
//! children out along one axis and may hold any number of them.
//!
//! # Tree Structure
//!
//! ```text
//! Container(Horizontal)
//! ├── Single(A)
//! └── Container(Vertical)
//!     ├── Single(B)
//!     └── Single(C)
//! ```
//!
//! # Invariants
//!
//! - The tree is never empty.
//! - Every container has at least two children.
//! - Every editor that is a direct child of a container points back at
//!   that container; the root editor of an unsplit tree has no parent.
//! - Every editor ID appears exactly once.
//!
//! Mutations that can break these (closing an editor) restore them before
//! returning, see [`EditorSplitTree::normalize`]. Normalizing also splices
//! a child container on its parent's axis into the parent, so nesting only
//! happens where the direction changes.

use std::collections::HashSet;
use std::hash::Hash;

use super::editor::Editor;
use super::error::SplitError;
use super::types::{Axis, ContainerId, Edge, EditorId};

/// A node in the split tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSplitTree<D> {
    /// A single editor pane.
    Single(Editor<D>),
    /// A container of two or more child nodes.
    Container(SplitContainer<D>),
}

/// An ordered group of child nodes sharing one layout axis.
///
/// Equality compares axis and children; the runtime container ID does
/// not take part.
#[derive(Debug, Clone)]
pub struct SplitContainer<D> {
    id: ContainerId,
    axis: Axis,
    children: Vec<EditorSplitTree<D>>,
}

impl<D> SplitContainer<D> {
    /// Creates an empty container.
    #[must_use]
    pub fn new(axis: Axis) -> Self {
        Self {
            id: ContainerId::new(),
            axis,
            children: Vec::new(),
        }
    }

    /// Creates a container that adopts `children`.
    #[must_use]
    pub fn with_children(axis: Axis, children: Vec<EditorSplitTree<D>>) -> Self {
        let mut container = Self::new(axis);
        for mut child in children {
            container.adopt(&mut child);
            container.children.push(child);
        }
        container
    }

    /// Returns the container's runtime ID.
    #[must_use]
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// Returns the layout axis.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the children in layout order.
    #[must_use]
    pub fn children(&self) -> &[EditorSplitTree<D>] {
        &self.children
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the container has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the index of the direct child editor with `id`.
    #[must_use]
    pub fn position_of(&self, id: EditorId) -> Option<usize> {
        self.children
            .iter()
            .position(|child| matches!(child, EditorSplitTree::Single(editor) if editor.id() == id))
    }

    fn adopt(&self, node: &mut EditorSplitTree<D>) {
        if let EditorSplitTree::Single(editor) = node {
            editor.set_parent(Some(self.id));
        }
    }

    fn invalid_index(&self, index: usize) -> SplitError {
        let len = self.children.len();
        tracing::warn!(
            container = %self.id,
            index,
            len,
            "Rejected split container mutation with out-of-range index"
        );
        SplitError::InvalidIndex { index, len }
    }

    /// Inserts `node` at `index` (which may equal the current length).
    ///
    /// # Errors
    ///
    /// Returns `SplitError::InvalidIndex` if `index` is past the end.
    pub fn insert(&mut self, index: usize, mut node: EditorSplitTree<D>) -> Result<(), SplitError> {
        if index > self.children.len() {
            return Err(self.invalid_index(index));
        }
        self.adopt(&mut node);
        self.children.insert(index, node);
        Ok(())
    }

    /// Removes and returns the child at `index`.
    ///
    /// A removed editor loses its parent reference. The container may be
    /// left with fewer than two children; callers flatten afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::InvalidIndex` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<EditorSplitTree<D>, SplitError> {
        if index >= self.children.len() {
            return Err(self.invalid_index(index));
        }
        let mut node = self.children.remove(index);
        if let EditorSplitTree::Single(editor) = &mut node {
            editor.set_parent(None);
        }
        Ok(node)
    }

    /// Replaces the child at `index` with `node`, returning the old child.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::InvalidIndex` if `index` is out of range.
    pub fn replace(
        &mut self,
        index: usize,
        mut node: EditorSplitTree<D>,
    ) -> Result<EditorSplitTree<D>, SplitError> {
        if index >= self.children.len() {
            return Err(self.invalid_index(index));
        }
        self.adopt(&mut node);
        let mut old = std::mem::replace(&mut self.children[index], node);
        if let EditorSplitTree::Single(editor) = &mut old {
            editor.set_parent(None);
        }
        Ok(old)
    }

    /// Splits the child at `index`, placing `new_editor` toward `edge`.
    ///
    /// If `edge` lies along this container's axis the new editor becomes
    /// a sibling: before the child for leading/top, after it for
    /// trailing/bottom. Otherwise the child is wrapped in a new container
    /// on the perpendicular axis holding `[new_editor, child]` for
    /// top/leading and `[child, new_editor]` for bottom/trailing.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::InvalidIndex` if `index` is out of range. The
    /// container is left unchanged.
    pub fn split(
        &mut self,
        edge: Edge,
        index: usize,
        new_editor: Editor<D>,
    ) -> Result<(), SplitError> {
        if index >= self.children.len() {
            return Err(self.invalid_index(index));
        }
        let mut node = EditorSplitTree::Single(new_editor);

        if edge.axis() == self.axis {
            let at = if edge.places_first() { index } else { index + 1 };
            self.adopt(&mut node);
            self.children.insert(at, node);
        } else {
            let placeholder = EditorSplitTree::Container(Self::new(self.axis));
            let original = std::mem::replace(&mut self.children[index], placeholder);
            let pair = if edge.places_first() {
                vec![node, original]
            } else {
                vec![original, node]
            };
            self.children[index] = EditorSplitTree::Container(Self::with_children(edge.axis(), pair));
        }
        Ok(())
    }

    /// Removes every direct child editor with `id`.
    ///
    /// Returns true if anything was removed.
    pub fn close_editor(&mut self, id: EditorId) -> bool {
        let before = self.children.len();
        self.children
            .retain(|child| !matches!(child, EditorSplitTree::Single(editor) if editor.id() == id));
        self.children.len() != before
    }

    /// Collapses degenerate descendants.
    ///
    /// Descendant containers are flattened bottom-up; afterwards any child
    /// container with no children is removed and any child container with
    /// one child is replaced by that child. A child container on this
    /// container's own axis has its children spliced in its place. Direct
    /// child editors are re-parented to this container. On return no
    /// container below this one has fewer than two children. This
    /// container's own child count is left for its parent to handle.
    pub fn flatten(&mut self) {
        for child in &mut self.children {
            if let EditorSplitTree::Container(container) = child {
                container.flatten();
            }
        }

        let mut flattened = Vec::with_capacity(self.children.len());
        for child in std::mem::take(&mut self.children) {
            let promoted = match child {
                EditorSplitTree::Container(mut container) if container.children.len() < 2 => {
                    container.children.pop()
                }
                other => Some(other),
            };
            match promoted {
                Some(EditorSplitTree::Container(mut container)) if container.axis == self.axis => {
                    flattened.append(&mut container.children);
                }
                Some(node) => flattened.push(node),
                None => {}
            }
        }
        self.children = flattened;

        let id = self.id;
        for child in &mut self.children {
            if let EditorSplitTree::Single(editor) = child {
                editor.set_parent(Some(id));
            }
        }
    }

    /// Points every editor below this container back at its direct parent.
    fn readopt(&mut self) {
        let id = self.id;
        for child in &mut self.children {
            match child {
                EditorSplitTree::Single(editor) => editor.set_parent(Some(id)),
                EditorSplitTree::Container(container) => container.readopt(),
            }
        }
    }
}

impl<D: PartialEq> PartialEq for SplitContainer<D> {
    fn eq(&self, other: &Self) -> bool {
        self.axis == other.axis && self.children == other.children
    }
}

impl<D: Eq> Eq for SplitContainer<D> {}

impl<D> EditorSplitTree<D> {
    /// Creates a tree holding one new empty editor.
    #[must_use]
    pub fn new_single() -> Self {
        Self::Single(Editor::new())
    }

    /// Returns true if this node is a single editor.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Returns true if this node is a container.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// Returns the editor if this node is a single editor.
    #[must_use]
    pub const fn as_editor(&self) -> Option<&Editor<D>> {
        match self {
            Self::Single(editor) => Some(editor),
            Self::Container(_) => None,
        }
    }

    /// Returns the container if this node is a container.
    #[must_use]
    pub const fn as_container(&self) -> Option<&SplitContainer<D>> {
        match self {
            Self::Single(_) => None,
            Self::Container(container) => Some(container),
        }
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Returns the first editor, in depth-first order, matching `predicate`.
    pub fn find_editor<F>(&self, mut predicate: F) -> Option<&Editor<D>>
    where
        F: FnMut(&Editor<D>) -> bool,
    {
        self.find_editor_by(&mut predicate)
    }

    fn find_editor_by(&self, predicate: &mut dyn FnMut(&Editor<D>) -> bool) -> Option<&Editor<D>> {
        match self {
            Self::Single(editor) => predicate(editor).then_some(editor),
            Self::Container(container) => container
                .children
                .iter()
                .find_map(|child| child.find_editor_by(predicate)),
        }
    }

    /// Mutable counterpart of [`find_editor`](Self::find_editor).
    pub fn find_editor_mut<F>(&mut self, mut predicate: F) -> Option<&mut Editor<D>>
    where
        F: FnMut(&Editor<D>) -> bool,
    {
        self.find_editor_mut_by(&mut predicate)
    }

    fn find_editor_mut_by(
        &mut self,
        predicate: &mut dyn FnMut(&Editor<D>) -> bool,
    ) -> Option<&mut Editor<D>> {
        match self {
            Self::Single(editor) => {
                if predicate(editor) {
                    Some(editor)
                } else {
                    None
                }
            }
            Self::Container(container) => container
                .children
                .iter_mut()
                .find_map(|child| child.find_editor_mut_by(predicate)),
        }
    }

    /// Finds an editor by ID.
    #[must_use]
    pub fn editor(&self, id: EditorId) -> Option<&Editor<D>> {
        self.find_editor(|editor| editor.id() == id)
    }

    /// Finds an editor by ID and returns a mutable reference.
    pub fn editor_mut(&mut self, id: EditorId) -> Option<&mut Editor<D>> {
        self.find_editor_mut(|editor| editor.id() == id)
    }

    /// Returns true if the tree contains an editor with `id`.
    #[must_use]
    pub fn contains_editor(&self, id: EditorId) -> bool {
        self.editor(id).is_some()
    }

    /// Returns some editor other than `except`.
    #[must_use]
    pub fn find_some_editor(&self, except: Option<EditorId>) -> Option<&Editor<D>> {
        self.find_editor(|editor| Some(editor.id()) != except)
    }

    /// Returns all editors in depth-first order.
    #[must_use]
    pub fn editors(&self) -> Vec<&Editor<D>> {
        let mut editors = Vec::new();
        self.collect_editors(&mut editors);
        editors
    }

    fn collect_editors<'a>(&'a self, editors: &mut Vec<&'a Editor<D>>) {
        match self {
            Self::Single(editor) => editors.push(editor),
            Self::Container(container) => {
                for child in &container.children {
                    child.collect_editors(editors);
                }
            }
        }
    }

    /// Returns all editor IDs in depth-first order.
    #[must_use]
    pub fn editor_ids(&self) -> Vec<EditorId> {
        self.editors().into_iter().map(Editor::id).collect()
    }

    /// Returns the number of editors in the tree.
    #[must_use]
    pub fn editor_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Container(container) => container.children.iter().map(Self::editor_count).sum(),
        }
    }

    /// Returns the depth of the tree. A single editor has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Single(_) => 0,
            Self::Container(container) => {
                1 + container.children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Calls `f` on every editor in depth-first order.
    pub fn for_each_editor_mut(&mut self, f: &mut dyn FnMut(&mut Editor<D>)) {
        match self {
            Self::Single(editor) => f(editor),
            Self::Container(container) => {
                for child in &mut container.children {
                    child.for_each_editor_mut(f);
                }
            }
        }
    }

    /// Finds a container by its runtime ID.
    pub fn container_mut(&mut self, id: ContainerId) -> Option<&mut SplitContainer<D>> {
        match self {
            Self::Single(_) => None,
            Self::Container(container) => {
                if container.id == id {
                    Some(container)
                } else {
                    container
                        .children
                        .iter_mut()
                        .find_map(|child| child.container_mut(id))
                }
            }
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Splits the editor `target`, placing `new_editor` toward `edge`.
    ///
    /// The target's container is found through the editor's parent
    /// reference. A root editor with no parent is wrapped in a new
    /// container along the edge's axis.
    ///
    /// # Errors
    ///
    /// - `SplitError::EditorNotFound` if `target` is not in the tree
    /// - `SplitError::ContainerNotFound` if the parent reference is stale
    pub fn split_editor(
        &mut self,
        target: EditorId,
        edge: Edge,
        new_editor: Editor<D>,
    ) -> Result<(), SplitError> {
        let parent = self
            .editor(target)
            .ok_or(SplitError::EditorNotFound(target))?
            .parent();

        match parent {
            None if self.is_single() => {
                let placeholder = Self::Container(SplitContainer::new(edge.axis()));
                let original = std::mem::replace(self, placeholder);
                let new_node = Self::Single(new_editor);
                let pair = if edge.places_first() {
                    vec![new_node, original]
                } else {
                    vec![original, new_node]
                };
                *self = Self::Container(SplitContainer::with_children(edge.axis(), pair));
                Ok(())
            }
            None => Err(SplitError::EditorNotFound(target)),
            Some(parent_id) => {
                let container = self
                    .container_mut(parent_id)
                    .ok_or(SplitError::ContainerNotFound(parent_id))?;
                let index = container
                    .position_of(target)
                    .ok_or(SplitError::EditorNotFound(target))?;
                container.split(edge, index, new_editor)
            }
        }
    }

    /// Removes the editor `id` and returns it.
    ///
    /// The tree is normalized afterwards. Removing the last editor leaves
    /// a fresh empty editor in its place.
    pub fn close_editor(&mut self, id: EditorId) -> Option<Editor<D>> {
        let parent = self.editor(id)?.parent();

        let removed = match parent {
            None => match std::mem::replace(self, Self::new_single()) {
                Self::Single(editor) => Some(editor),
                other => {
                    *self = other;
                    None
                }
            },
            Some(parent_id) => {
                let container = self.container_mut(parent_id)?;
                let index = container.position_of(id)?;
                match container.remove(index) {
                    Ok(Self::Single(editor)) => Some(editor),
                    _ => None,
                }
            }
        };

        self.normalize();
        removed
    }

    /// Restores the structural invariants at the root.
    ///
    /// Flattens every container, replaces an empty root container with a
    /// fresh editor, and promotes the sole child of a root container to
    /// the root. Parent references are then rebuilt from the tree's
    /// shape, so a root editor has none.
    pub fn normalize(&mut self) {
        if let Self::Container(container) = self {
            container.flatten();
            match container.children.len() {
                0 => *self = Self::new_single(),
                1 => {
                    if let Some(only) = container.children.pop() {
                        *self = only;
                    }
                }
                _ => {}
            }
        }

        match self {
            Self::Single(editor) => editor.set_parent(None),
            Self::Container(container) => container.readopt(),
        }
    }

    /// Rebuilds the tree with every editor passed through `f`.
    ///
    /// Editors for which `f` returns `None` are dropped, along with any
    /// container left empty. Returns `None` if nothing survives. The
    /// result is not normalized.
    pub(crate) fn filter_map_editors<E>(
        self,
        f: &mut dyn FnMut(Editor<D>) -> Option<Editor<E>>,
    ) -> Option<EditorSplitTree<E>> {
        match self {
            Self::Single(editor) => f(editor).map(EditorSplitTree::Single),
            Self::Container(container) => {
                let axis = container.axis;
                let children: Vec<EditorSplitTree<E>> = container
                    .children
                    .into_iter()
                    .filter_map(|child| child.filter_map_editors(f))
                    .collect();
                if children.is_empty() {
                    None
                } else {
                    Some(EditorSplitTree::Container(SplitContainer::with_children(
                        axis, children,
                    )))
                }
            }
        }
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Returns true if the tree has no container with fewer than two
    /// children, every editor's parent reference names its container,
    /// and no editor ID appears twice.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut seen = HashSet::new();
        self.check_node(None, &mut seen)
    }

    fn check_node(&self, parent: Option<ContainerId>, seen: &mut HashSet<EditorId>) -> bool {
        match self {
            Self::Single(editor) => editor.parent() == parent && seen.insert(editor.id()),
            Self::Container(container) => {
                container.children.len() >= 2
                    && container
                        .children
                        .iter()
                        .all(|child| child.check_node(Some(container.id), seen))
            }
        }
    }
}

impl<D: Clone + PartialEq> EditorSplitTree<D> {
    /// Closes `document` in every editor.
    ///
    /// Editors left without tabs stay in the tree. Returns the number of
    /// editors that had the document open.
    pub fn close_document_everywhere(&mut self, document: &D) -> usize {
        let mut closed = 0;
        self.for_each_editor_mut(&mut |editor| {
            if editor.close_tab(document) {
                closed += 1;
            }
        });
        closed
    }

    /// Returns true if every editor's selection is one of its tabs.
    #[must_use]
    pub fn selections_valid(&self) -> bool {
        self.editors().into_iter().all(|editor| {
            editor
                .selected_tab()
                .is_none_or(|selected| editor.contains(selected))
        })
    }
}

impl<D: Clone + Eq + Hash> EditorSplitTree<D> {
    /// Returns every document open anywhere in the tree.
    #[must_use]
    pub fn collect_open_documents(&self) -> HashSet<D> {
        self.editors()
            .into_iter()
            .flat_map(|editor| editor.tabs().iter().cloned())
            .collect()
    }
}

impl<D> Default for EditorSplitTree<D> {
    fn default() -> Self {
        Self::new_single()
    }
}
