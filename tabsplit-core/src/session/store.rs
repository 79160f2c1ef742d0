//! Workspace state storage
//!
//! Saved sessions are opaque byte blobs kept under string keys in a
//! per-workspace store. The store is the only place that performs I/O;
//! everything above it works on in-memory snapshots.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "tabsplit";

/// Errors that can occur while reading or writing workspace state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used as a storage name
    #[error("invalid workspace state key: {0:?}")]
    InvalidKey(String),

    /// No platform data directory is available
    #[error("no data directory available for workspace state")]
    NoDataDirectory,
}

/// Key/value persistence for one workspace.
pub trait WorkspaceStateStore {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, or removes the key when `value` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: Option<&[u8]>) -> Result<(), StoreError>;
}

/// In-memory store, useful for tests and for workspaces that are never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WorkspaceStateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Option<&[u8]>) -> Result<(), StoreError> {
        match value {
            Some(bytes) => {
                self.entries.insert(key.to_owned(), bytes.to_vec());
            }
            None => {
                self.entries.remove(key);
            }
        }
        Ok(())
    }
}

/// File-backed store keeping one file per key inside a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the store for the workspace rooted at `workspace_root`.
    ///
    /// The directory lives under the platform's local data directory and
    /// is named by a UUID derived from the workspace path, so the same
    /// workspace always maps to the same store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDirectory` if the platform has no local
    /// data directory.
    pub fn for_workspace(workspace_root: &Path) -> Result<Self, StoreError> {
        let base = dirs::data_local_dir().ok_or(StoreError::NoDataDirectory)?;
        let name = Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            workspace_root.to_string_lossy().as_bytes(),
        );
        Ok(Self::new(
            base.join(APP_DIR_NAME)
                .join("workspaces")
                .join(name.to_string()),
        ))
    }

    /// Returns the directory holding this store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if valid {
            Ok(self.dir.join(format!("{key}.state")))
        } else {
            Err(StoreError::InvalidKey(key.to_owned()))
        }
    }
}

impl WorkspaceStateStore for FileStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn set(&mut self, key: &str, value: Option<&[u8]>) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match value {
            Some(bytes) => {
                std::fs::create_dir_all(&self.dir)?;
                let tmp = path.with_extension("state.tmp");
                std::fs::write(&tmp, bytes)?;
                std::fs::rename(&tmp, &path)?;
                tracing::debug!(key, bytes = bytes.len(), path = %path.display(), "Wrote workspace state");
            }
            None => match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(key, "Removed workspace state"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(e)),
            },
        }
        Ok(())
    }
}
