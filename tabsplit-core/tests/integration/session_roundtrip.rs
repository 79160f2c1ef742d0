//! Save and restore editor layouts through the file-backed workspace store

use std::path::{Path, PathBuf};

use tabsplit_core::config::{SessionSettings, Settings};
use tabsplit_core::document::{DocumentLocator, ExistingPathResolver};
use tabsplit_core::session::{
    EditorManager, FileStateStore, OPEN_TABS_KEY, WorkspaceStateStore,
};
use tabsplit_core::split::Edge;
use tempfile::TempDir;

/// A workspace directory with a few source files and a state store
struct Workspace {
    _root: TempDir,
    files: Vec<PathBuf>,
    store: FileStateStore,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = ["main.rs", "lib.rs", "util.rs"]
            .iter()
            .map(|name| {
                let path = root.path().join(name);
                std::fs::write(&path, "// source\n").unwrap();
                path
            })
            .collect();
        let store = FileStateStore::new(root.path().join(".state"));
        Self {
            _root: root,
            files,
            store,
        }
    }

    fn locator(&self, index: usize) -> DocumentLocator {
        DocumentLocator::new(&self.files[index])
    }
}

fn locators(paths: &[&Path]) -> Vec<DocumentLocator> {
    paths.iter().map(|path| DocumentLocator::new(*path)).collect()
}

/// Left editor with main.rs and lib.rs, right editor with util.rs, focus
/// on the right.
fn two_pane_manager(workspace: &Workspace) -> EditorManager {
    let mut manager = EditorManager::new(SessionSettings::default());
    let left = manager.active_editor_id();
    manager.open_document(workspace.locator(0), None).unwrap();
    manager.open_document(workspace.locator(1), None).unwrap();

    // The split copies lib.rs into the new editor and focuses it
    let right = manager.split_editor(left, Edge::Trailing).unwrap();
    manager.close_document(&workspace.locator(1), Some(right)).unwrap();
    manager.open_document(workspace.locator(2), Some(right)).unwrap();
    manager
}

#[test]
fn layout_survives_save_and_restore() {
    let mut workspace = Workspace::new();
    let manager = two_pane_manager(&workspace);
    manager.save(&mut workspace.store).unwrap();

    let restored: EditorManager = EditorManager::restore_or_default(
        &workspace.store,
        &ExistingPathResolver,
        SessionSettings::default(),
    );

    assert_eq!(restored.root(), manager.root());
    assert_eq!(restored.active_editor_id(), manager.active_editor_id());
    assert_eq!(
        restored.active_editor().unwrap().selected_tab(),
        Some(&workspace.locator(2))
    );
}

#[test]
fn deleted_files_are_dropped_on_restore() {
    let mut workspace = Workspace::new();
    let manager = two_pane_manager(&workspace);
    let right = manager.active_editor_id();
    manager.save(&mut workspace.store).unwrap();

    std::fs::remove_file(&workspace.files[1]).unwrap();
    std::fs::remove_file(&workspace.files[2]).unwrap();

    let restored: EditorManager = EditorManager::restore_or_default(
        &workspace.store,
        &ExistingPathResolver,
        SessionSettings::default(),
    );

    // The right editor lost its only file and is pruned; focus falls back
    assert!(restored.editor(right).is_none());
    assert!(restored.root().is_single());
    let left = restored.active_editor().unwrap();
    assert_eq!(left.tabs(), locators(&[&workspace.files[0]]).as_slice());
    assert_eq!(left.selected_tab(), Some(&workspace.locator(0)));
}

#[test]
fn emptied_editors_can_be_kept() {
    let mut workspace = Workspace::new();
    let manager = two_pane_manager(&workspace);
    let right = manager.active_editor_id();
    manager.save(&mut workspace.store).unwrap();
    std::fs::remove_file(&workspace.files[2]).unwrap();

    let settings = SessionSettings {
        prune_emptied_editors: false,
        ..SessionSettings::default()
    };
    let restored: EditorManager =
        EditorManager::restore_or_default(&workspace.store, &ExistingPathResolver, settings);

    assert_eq!(restored.root().editor_count(), 2);
    assert_eq!(restored.active_editor_id(), right);
    assert!(restored.active_editor().unwrap().is_empty());
}

#[test]
fn corrupt_state_file_yields_fresh_manager() {
    let mut workspace = Workspace::new();
    workspace
        .store
        .set(OPEN_TABS_KEY, Some(b"{\"focus\":".as_slice()))
        .unwrap();

    let mut manager: EditorManager = EditorManager::new(SessionSettings::default());
    let err = manager
        .restore(&workspace.store, &ExistingPathResolver)
        .unwrap_err();
    assert!(err.is_corrupt());

    let fresh: EditorManager = EditorManager::restore_or_default(
        &workspace.store,
        &ExistingPathResolver,
        SessionSettings::default(),
    );
    assert!(fresh.root().is_single());
    assert!(fresh.open_documents().is_empty());
}

#[test]
fn cleared_state_restores_nothing() {
    let mut workspace = Workspace::new();
    let manager = two_pane_manager(&workspace);
    manager.save(&mut workspace.store).unwrap();
    workspace.store.set(OPEN_TABS_KEY, None).unwrap();

    let mut restored: EditorManager = EditorManager::new(SessionSettings::default());
    assert!(
        !restored
            .restore(&workspace.store, &ExistingPathResolver)
            .unwrap()
    );
    assert!(restored.open_documents().is_empty());
}

#[test]
fn saved_state_is_plain_json_under_open_tabs_key() {
    let mut workspace = Workspace::new();
    let manager = two_pane_manager(&workspace);
    manager.save(&mut workspace.store).unwrap();

    let bytes = workspace.store.get(OPEN_TABS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["groups"]["type"], "horizontal");
    assert_eq!(
        value["focus"],
        manager.active_editor_id().as_uuid().to_string()
    );
}

#[test]
fn settings_round_trip_drives_manager() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("settings.toml");

    let mut settings = Settings::default();
    settings.session.focus_new_split = false;
    settings.session.open_selected_in_split = false;
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);

    let mut manager: EditorManager = EditorManager::new(loaded.session);
    let first = manager.active_editor_id();
    manager
        .open_document(DocumentLocator::new("/tmp/scratch.rs"), None)
        .unwrap();
    let second = manager.split_editor(first, Edge::Bottom).unwrap();

    assert_eq!(manager.active_editor_id(), first);
    assert!(manager.editor(second).unwrap().is_empty());
}
