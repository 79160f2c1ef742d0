//! Document handles and locators
//!
//! Editors hold documents by value. A live document is any type that
//! implements [`Document`]; a [`DocumentLocator`] is the portable,
//! path-based reference written into saved sessions.
//!
//! Restoring a session turns locators back into live documents through a
//! [`DocumentResolver`], which is the boundary to the workspace's file
//! lookup.
//!
//! # Example
//!
//! ```
//! use tabsplit_core::document::{DocumentLocator, DocumentResolver};
//!
//! let resolver = |locator: &DocumentLocator| {
//!     (locator.path().extension()? == "rs").then(|| locator.clone())
//! };
//!
//! assert!(resolver.resolve(&DocumentLocator::new("/src/lib.rs")).is_some());
//! assert!(resolver.resolve(&DocumentLocator::new("/notes.txt")).is_none());
//! ```

use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque, stable reference to a document's location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentLocator(PathBuf);

impl DocumentLocator {
    /// Creates a locator for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Returns the path this locator refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for DocumentLocator {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for DocumentLocator {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for DocumentLocator {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl fmt::Display for DocumentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A live document that can be shown in an editor tab.
///
/// Equality decides tab identity: an editor never holds two documents
/// that compare equal.
pub trait Document: Clone + Eq + Hash + fmt::Debug {
    /// Returns the locator written into saved sessions for this document.
    fn locator(&self) -> DocumentLocator;
}

impl Document for DocumentLocator {
    fn locator(&self) -> DocumentLocator {
        self.clone()
    }
}

/// Resolves locators from a saved session into live documents.
pub trait DocumentResolver<D> {
    /// Returns the live document for `locator`, or `None` if it no longer
    /// exists.
    fn resolve(&self, locator: &DocumentLocator) -> Option<D>;
}

impl<D, F> DocumentResolver<D> for F
where
    F: Fn(&DocumentLocator) -> Option<D>,
{
    fn resolve(&self, locator: &DocumentLocator) -> Option<D> {
        self(locator)
    }
}

/// Resolver that keeps a locator only while its path exists on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistingPathResolver;

impl DocumentResolver<DocumentLocator> for ExistingPathResolver {
    fn resolve(&self, locator: &DocumentLocator) -> Option<DocumentLocator> {
        locator.path().exists().then(|| locator.clone())
    }
}
