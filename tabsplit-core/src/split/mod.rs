//! Editor split tree
//!
//! This module provides the structural model behind a workspace window:
//! which editors are open, how they are arranged into panes, and how the
//! arrangement changes as panes are split and closed.
//!
//! # Architecture
//!
//! - **Editors are leaves**: each [`Editor`] holds an ordered set of tabs
//! - **Containers own children**: a [`SplitContainer`] lays out any number
//!   of children along one [`Axis`]
//! - **Merge or wrap**: splitting along the container's axis adds a
//!   sibling; splitting across it wraps the pane in a new container
//! - **Self-healing**: closing panes flattens single-child containers so
//!   the tree depth follows the number of distinct layout directions
//!
//! # Module Structure
//!
//! - `types` - Identifiers and layout enums (`EditorId`, `ContainerId`, `Axis`, `Edge`)
//! - `editor` - The tab-holding leaf (`Editor`)
//! - `tree` - Tree and container (`EditorSplitTree`, `SplitContainer`)
//! - `error` - Error types (`SplitError`)
//!
//! # Example
//!
//! ```
//! use tabsplit_core::document::DocumentLocator;
//! use tabsplit_core::split::{Edge, Editor, EditorSplitTree};
//!
//! let mut tree: EditorSplitTree<DocumentLocator> = EditorSplitTree::new_single();
//! let first = tree.editor_ids()[0];
//!
//! // Split the only pane to the right
//! let right = Editor::new();
//! let right_id = right.id();
//! tree.split_editor(first, Edge::Trailing, right).unwrap();
//! assert_eq!(tree.editor_count(), 2);
//!
//! // Closing it collapses the container again
//! tree.close_editor(right_id);
//! assert!(tree.is_single());
//! ```

mod editor;
mod error;
mod tree;
mod types;

pub use editor::Editor;
pub use error::SplitError;
pub use tree::{EditorSplitTree, SplitContainer};
pub use types::{Axis, ContainerId, Edge, EditorId};
