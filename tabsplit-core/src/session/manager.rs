//! Editor manager
//!
//! The [`EditorManager`] owns one workspace window's split tree and tracks
//! which editor has focus. It routes document requests to editors, keeps a
//! bounded history of previously focused editors for fallback when the
//! focused editor closes, and notifies listeners when the focused editor's
//! selection changes.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use super::restore::{self, OPEN_TABS_KEY, RestorationError, RestorationState};
use super::store::WorkspaceStateStore;
use crate::config::SessionSettings;
use crate::document::{Document, DocumentLocator, DocumentResolver};
use crate::split::{Edge, Editor, EditorId, EditorSplitTree, SplitError};
use crate::tracing::span_names;

/// Callback receiving the focused editor and its selected document.
pub type SelectionListener<D> = Box<dyn FnMut(EditorId, Option<&D>)>;

/// Handle returned by [`EditorManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The single live binding between the focused editor and the listeners.
#[derive(Debug)]
struct FocusSubscription<D> {
    editor: EditorId,
    /// Last selection delivered to listeners; `None` until the first
    /// delivery.
    published: Option<Option<D>>,
}

impl<D> FocusSubscription<D> {
    const fn bind(editor: EditorId) -> Self {
        Self {
            editor,
            published: None,
        }
    }
}

/// Owns the split tree of one workspace window and its focus state.
pub struct EditorManager<D = DocumentLocator> {
    root: EditorSplitTree<D>,
    active: EditorId,
    history: VecDeque<EditorId>,
    settings: SessionSettings,
    subscription: FocusSubscription<D>,
    listeners: Vec<(ListenerId, SelectionListener<D>)>,
    next_listener: u64,
}

impl<D: Document> EditorManager<D> {
    /// Creates a manager holding a single empty editor, which has focus.
    #[must_use]
    pub fn new(settings: SessionSettings) -> Self {
        let editor = Editor::new();
        let active = editor.id();
        Self::with_root(EditorSplitTree::Single(editor), active, settings)
    }

    /// Creates a manager from a restored layout.
    ///
    /// If the state's focus is not in its tree, the first editor gets
    /// focus.
    #[must_use]
    pub fn from_state(state: RestorationState<D>, settings: SessionSettings) -> Self {
        let mut manager = Self::new(settings);
        manager.install(state);
        manager
    }

    fn with_root(root: EditorSplitTree<D>, active: EditorId, settings: SessionSettings) -> Self {
        let mut manager = Self {
            root,
            active,
            history: VecDeque::new(),
            settings,
            subscription: FocusSubscription::bind(active),
            listeners: Vec::new(),
            next_listener: 0,
        };
        manager.publish_selection();
        manager
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the split tree.
    #[must_use]
    pub const fn root(&self) -> &EditorSplitTree<D> {
        &self.root
    }

    /// Returns the session settings in effect.
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Returns the ID of the focused editor.
    #[must_use]
    pub const fn active_editor_id(&self) -> EditorId {
        self.active
    }

    /// Returns the focused editor.
    #[must_use]
    pub fn active_editor(&self) -> Option<&Editor<D>> {
        self.root.editor(self.active)
    }

    /// Finds an editor by ID.
    #[must_use]
    pub fn editor(&self, id: EditorId) -> Option<&Editor<D>> {
        self.root.editor(id)
    }

    /// Returns previously focused editors that are still open, most
    /// recent first.
    #[must_use]
    pub fn history(&self) -> Vec<EditorId> {
        self.history
            .iter()
            .copied()
            .filter(|id| *id != self.active && self.root.contains_editor(*id))
            .collect()
    }

    /// Returns every document open in any editor.
    #[must_use]
    pub fn open_documents(&self) -> HashSet<D> {
        self.root.collect_open_documents()
    }

    // ========================================================================
    // Documents
    // ========================================================================

    fn target(&self, in_editor: Option<EditorId>) -> EditorId {
        in_editor.unwrap_or(self.active)
    }

    fn editor_for_update(&mut self, id: EditorId) -> Result<&mut Editor<D>, SplitError> {
        self.root.editor_mut(id).ok_or(SplitError::EditorNotFound(id))
    }

    /// Opens `document` in `in_editor`, or in the focused editor when
    /// `None`, and selects it. Focus does not move.
    ///
    /// Returns the editor the document was opened in.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::EditorNotFound` if `in_editor` is not open.
    pub fn open_document(
        &mut self,
        document: D,
        in_editor: Option<EditorId>,
    ) -> Result<EditorId, SplitError> {
        let target = self.target(in_editor);
        self.editor_for_update(target)?.open_tab(document);
        self.publish_selection();
        Ok(target)
    }

    /// Closes `document` in `in_editor`, or in the focused editor when
    /// `None`. The editor stays open even if it has no tabs left.
    ///
    /// Returns true if the document was open there.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::EditorNotFound` if `in_editor` is not open.
    pub fn close_document(
        &mut self,
        document: &D,
        in_editor: Option<EditorId>,
    ) -> Result<bool, SplitError> {
        let target = self.target(in_editor);
        let closed = self.editor_for_update(target)?.close_tab(document);
        self.publish_selection();
        Ok(closed)
    }

    /// Selects `document` in `in_editor`, or in the focused editor when
    /// `None`.
    ///
    /// Returns false if the document is not open there.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::EditorNotFound` if `in_editor` is not open.
    pub fn select_document(
        &mut self,
        document: &D,
        in_editor: Option<EditorId>,
    ) -> Result<bool, SplitError> {
        let target = self.target(in_editor);
        let selected = self.editor_for_update(target)?.select_tab(document);
        self.publish_selection();
        Ok(selected)
    }

    /// Closes `document` in every editor, for example after the file was
    /// deleted. Returns the number of editors that had it open.
    pub fn close_document_everywhere(&mut self, document: &D) -> usize {
        let closed = self.root.close_document_everywhere(document);
        if closed > 0 {
            tracing::debug!(?document, editor_count = closed, "Closed document everywhere");
        }
        self.publish_selection();
        closed
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Moves focus to `editor`.
    ///
    /// The previously focused editor is remembered in the focus history,
    /// and listeners receive the new editor's selection right away.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::EditorNotFound` if `editor` is not open.
    pub fn set_focus(&mut self, editor: EditorId) -> Result<(), SplitError> {
        if !self.root.contains_editor(editor) {
            return Err(SplitError::EditorNotFound(editor));
        }
        self.activate(editor);
        Ok(())
    }

    /// Moves focus back to the most recently focused editor that is still
    /// open. Returns the newly focused editor, or `None` if the history has
    /// nothing usable.
    pub fn focus_previous(&mut self) -> Option<EditorId> {
        let current = self.active;
        let previous = self.pop_history(current)?;
        self.activate(previous);
        Some(previous)
    }

    fn activate(&mut self, editor: EditorId) {
        if editor == self.active {
            return;
        }
        let previous = std::mem::replace(&mut self.active, editor);
        self.remember(previous, editor);
        tracing::debug!(editor_id = %editor, %previous, "Focus changed");
        self.rebind_subscription();
    }

    /// Records `previous` as the most recent history entry. The history
    /// never holds the focused editor or the same editor twice.
    fn remember(&mut self, previous: EditorId, focused: EditorId) {
        let limit = self.settings.focus_history_limit;
        if limit == 0 {
            return;
        }
        self.history.retain(|id| *id != previous && *id != focused);
        self.history.push_front(previous);
        self.history.truncate(limit);
    }

    /// Pops history entries until one names a live editor other than
    /// `except`.
    fn pop_history(&mut self, except: EditorId) -> Option<EditorId> {
        while let Some(candidate) = self.history.pop_front() {
            if candidate != except && self.root.contains_editor(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Picks the editor to focus after `closed` went away.
    fn fallback_focus(&mut self, closed: EditorId) -> EditorId {
        if let Some(previous) = self.pop_history(closed) {
            return previous;
        }
        if let Some(editor) = self.root.find_some_editor(Some(closed)) {
            return editor.id();
        }
        let editor = Editor::new();
        let id = editor.id();
        self.root = EditorSplitTree::Single(editor);
        id
    }

    // ========================================================================
    // Selection subscription
    // ========================================================================

    /// Registers a listener for the focused editor's selection.
    ///
    /// The listener is called once right away with the current selection,
    /// then whenever focus moves or the focused editor's selection changes.
    pub fn subscribe(
        &mut self,
        mut listener: impl FnMut(EditorId, Option<&D>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        let selected = self.active_editor().and_then(Editor::selected_tab);
        listener(self.active, selected);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn rebind_subscription(&mut self) {
        self.subscription = FocusSubscription::bind(self.active);
        self.publish_selection();
    }

    /// Delivers the subscribed editor's selection if it differs from the
    /// last delivered value.
    fn publish_selection(&mut self) {
        let editor_id = self.subscription.editor;
        let Some(editor) = self.root.editor(editor_id) else {
            return;
        };
        let selected = editor.selected_tab();
        if self
            .subscription
            .published
            .as_ref()
            .is_some_and(|last| last.as_ref() == selected)
        {
            return;
        }

        self.subscription.published = Some(selected.cloned());
        for (_, listener) in &mut self.listeners {
            listener(editor_id, selected);
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Splits `editor`, creating a new editor toward `edge`.
    ///
    /// Depending on settings, the new editor opens the source editor's
    /// selected document and takes focus.
    ///
    /// Returns the new editor's ID.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::EditorNotFound` if `editor` is not open.
    pub fn split_editor(&mut self, editor: EditorId, edge: Edge) -> Result<EditorId, SplitError> {
        let _span =
            crate::trace_operation!(span_names::LAYOUT_SPLIT, editor_id = %editor, edge = %edge)
                .entered();

        let source = self
            .root
            .editor(editor)
            .ok_or(SplitError::EditorNotFound(editor))?;
        let mut new_editor = Editor::new();
        if self.settings.open_selected_in_split {
            if let Some(selected) = source.selected_tab() {
                new_editor.open_tab(selected.clone());
            }
        }
        let new_id = new_editor.id();

        self.root.split_editor(editor, edge, new_editor)?;
        if self.settings.focus_new_split {
            self.activate(new_id);
        }

        self.check_invariants();
        Ok(new_id)
    }

    /// Closes `editor` and returns it.
    ///
    /// The layout is flattened afterwards. If the focused editor closes,
    /// focus moves to the most recent still-open editor in the history,
    /// else to any other editor. Closing the last editor leaves a fresh
    /// empty one.
    ///
    /// # Errors
    ///
    /// Returns `SplitError::EditorNotFound` if `editor` is not open.
    pub fn close_editor(&mut self, editor: EditorId) -> Result<Editor<D>, SplitError> {
        let _span =
            crate::trace_operation!(span_names::LAYOUT_CLOSE_EDITOR, editor_id = %editor).entered();

        let closed = self
            .root
            .close_editor(editor)
            .ok_or(SplitError::EditorNotFound(editor))?;

        if editor == self.active {
            let next = self.fallback_focus(editor);
            self.active = next;
            tracing::debug!(editor_id = %next, closed = %editor, "Focus moved from closed editor");
            self.rebind_subscription();
        }

        self.check_invariants();
        Ok(closed)
    }

    /// Collapses singleton and empty containers throughout the layout.
    pub fn flatten(&mut self) {
        let _span = crate::trace_operation_debug!(
            span_names::LAYOUT_FLATTEN,
            editor_count = self.root.editor_count()
        )
        .entered();

        self.root.normalize();
        self.check_invariants();
    }

    fn check_invariants(&self) {
        debug_assert!(self.root.is_well_formed(), "split tree is malformed");
        debug_assert!(
            self.root.contains_editor(self.active),
            "focused editor is not in the tree"
        );
        debug_assert!(self.root.selections_valid(), "selection outside tabs");
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Returns the current layout and focus.
    #[must_use]
    pub fn snapshot(&self) -> RestorationState<D> {
        RestorationState {
            focus: self.active,
            groups: self.root.clone(),
        }
    }

    /// Installs a restored layout, replacing the current one.
    ///
    /// The layout is normalized first, so singleton containers collapse
    /// and parent references are rebuilt. Focus history is cleared and
    /// listeners receive the new focused editor's selection.
    pub fn install(&mut self, state: RestorationState<D>) {
        let RestorationState { focus, mut groups } = state;
        groups.normalize();
        self.root = groups;
        self.history.clear();
        self.active = if self.root.contains_editor(focus) {
            focus
        } else {
            self.fallback_focus(focus)
        };
        self.rebind_subscription();
        self.check_invariants();
    }

    /// Saves the layout and focus to `store` under [`OPEN_TABS_KEY`].
    ///
    /// If the layout cannot be encoded the stored value is cleared, so a
    /// stale layout is never restored.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the store fails.
    pub fn save<S>(&self, store: &mut S) -> Result<(), RestorationError>
    where
        S: WorkspaceStateStore + ?Sized,
    {
        let _span = crate::trace_operation!(
            span_names::SESSION_SAVE,
            key = OPEN_TABS_KEY,
            editor_count = self.root.editor_count()
        )
        .entered();

        match restore::serialize(&self.root, self.active) {
            Ok(bytes) => {
                store.set(OPEN_TABS_KEY, Some(bytes.as_slice()))?;
                tracing::info!(bytes = bytes.len(), "Saved editor layout");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode editor layout, clearing saved state");
                store.set(OPEN_TABS_KEY, None)?;
                Err(e)
            }
        }
    }

    /// Restores the layout saved in `store`, resolving documents through
    /// `resolver`.
    ///
    /// Returns false, leaving the manager unchanged, if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the saved layout is corrupt.
    /// The manager is unchanged in both cases.
    pub fn restore<S, R>(&mut self, store: &S, resolver: &R) -> Result<bool, RestorationError>
    where
        S: WorkspaceStateStore + ?Sized,
        R: DocumentResolver<D> + ?Sized,
    {
        let Some(bytes) = store.get(OPEN_TABS_KEY)? else {
            tracing::debug!(key = OPEN_TABS_KEY, "No saved editor layout");
            return Ok(false);
        };
        let state = restore::restore(&bytes, resolver, self.settings.prune_emptied_editors)?;
        self.install(state);
        Ok(true)
    }

    /// Creates a manager, restoring the saved layout when settings allow.
    ///
    /// A missing, unreadable or corrupt saved layout is logged and yields a
    /// fresh manager.
    #[must_use]
    pub fn restore_or_default<S, R>(store: &S, resolver: &R, settings: SessionSettings) -> Self
    where
        S: WorkspaceStateStore + ?Sized,
        R: DocumentResolver<D> + ?Sized,
    {
        let mut manager = Self::new(settings);
        if !manager.settings.restore_on_open {
            return manager;
        }
        match manager.restore(store, resolver) {
            Ok(_) => {}
            Err(e) if e.is_corrupt() => {
                tracing::warn!(error = %e, "Discarding corrupt saved editor layout");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore saved editor layout");
            }
        }
        manager
    }
}

impl<D: Document> Default for EditorManager<D> {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl<D: fmt::Debug> fmt::Debug for EditorManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorManager")
            .field("root", &self.root)
            .field("active", &self.active)
            .field("history", &self.history)
            .field("settings", &self.settings)
            .field("subscription", &self.subscription)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
