//! `tabsplit` Core Library
//!
//! This crate provides the editor layout model of a workspace window: tabbed
//! editors arranged in a tree of horizontal and vertical splits, focus
//! tracking across editors, and saving and restoring the layout between
//! runs.
//!
//! # Crate Structure
//!
//! - [`split`] - Split tree model (`Editor`, `SplitContainer`, `EditorSplitTree`)
//! - [`document`] - Document trait, locators and resolvers
//! - [`session`] - Focus management, restoration codec and workspace state storage
//! - [`config`] - Settings and TOML persistence
//! - [`tracing`] - Structured logging setup and standard span names

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod session;
pub mod split;
pub mod tracing;

// =============================================================================
// Convenience re-exports
// =============================================================================

pub use config::{ConfigError, ConfigResult, LoggingSettings, SessionSettings, Settings};
pub use document::{Document, DocumentLocator, DocumentResolver, ExistingPathResolver};
pub use session::{
    EditorManager, FileStateStore, ListenerId, MemoryStateStore, OPEN_TABS_KEY,
    RestorationError, RestorationState, SelectionListener, StoreError, WorkspaceStateStore,
};
pub use split::{Axis, ContainerId, Edge, Editor, EditorId, EditorSplitTree, SplitContainer, SplitError};
pub use tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult,
    get_tracing_config, init_tracing, is_tracing_initialized, span_names,
};
