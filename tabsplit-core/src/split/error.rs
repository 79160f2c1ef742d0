//! Error types for split tree operations

use super::types::{ContainerId, EditorId};

/// Errors that can occur during split tree operations.
///
/// None of these leave the tree in a modified state: an operation that
/// fails is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// The specified editor was not found in the tree.
    #[error("editor not found: {0}")]
    EditorNotFound(EditorId),

    /// An editor's back-reference points at a container that is not in
    /// the tree.
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    /// A child index outside the container's current range.
    #[error("invalid child index {index} (container has {len} children)")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of children at the time of the request.
        len: usize,
    },
}
