//! Session management for `tabsplit`
//!
//! This module ties a split tree to the rest of a workspace window: the
//! [`EditorManager`] tracks focus and routes document requests, the
//! restoration codec saves and restores layouts, and a
//! [`WorkspaceStateStore`] holds the saved bytes.
//!
//! # Example
//!
//! ```
//! use tabsplit_core::config::SessionSettings;
//! use tabsplit_core::document::DocumentLocator;
//! use tabsplit_core::session::{EditorManager, MemoryStateStore};
//! use tabsplit_core::split::Edge;
//!
//! let mut manager: EditorManager = EditorManager::new(SessionSettings::default());
//! manager.open_document(DocumentLocator::new("/src/lib.rs"), None).unwrap();
//! let first = manager.active_editor_id();
//! manager.split_editor(first, Edge::Trailing).unwrap();
//!
//! let mut store = MemoryStateStore::new();
//! manager.save(&mut store).unwrap();
//!
//! let identity = |locator: &DocumentLocator| Some(locator.clone());
//! let restored: EditorManager =
//!     EditorManager::restore_or_default(&store, &identity, SessionSettings::default());
//! assert_eq!(restored.root(), manager.root());
//! ```

mod manager;
pub mod restore;
mod store;

pub use manager::{EditorManager, ListenerId, SelectionListener};
pub use restore::{
    OPEN_TABS_KEY, RestorationError, RestorationState, deserialize, repair_dangling_references,
    serialize,
};
pub use store::{APP_DIR_NAME, FileStateStore, MemoryStateStore, StoreError, WorkspaceStateStore};
