//! Core type definitions for the editor split tree
//!
//! This module contains the identifier types and layout enums used
//! throughout the split tree and session restoration code.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an editor (one pane of tabs).
///
/// The identifier is generated when the editor is created and is
/// preserved across serialization, so a restored session can point its
/// focus at the same editor it had before shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(pub Uuid);

impl EditorId {
    /// Creates a new random editor ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an editor ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EditorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Editor({})", self.0)
    }
}

/// Runtime identifier for a split container.
///
/// Editors point back at their container through this handle. It is
/// never persisted: restored containers receive fresh IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub Uuid);

impl ContainerId {
    /// Creates a new random container ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container({})", self.0)
    }
}

/// Layout axis of a split container.
///
/// Children of a horizontal container are placed side by side
/// (leading to trailing); children of a vertical container are stacked
/// (top to bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Children laid out left to right.
    Horizontal,
    /// Children laid out top to bottom.
    Vertical,
}

impl Axis {
    /// Returns the other axis.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => write!(f, "Horizontal"),
            Self::Vertical => write!(f, "Vertical"),
        }
    }
}

/// Edge of an editor toward which a split is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Above the editor.
    Top,
    /// Below the editor.
    Bottom,
    /// Left of the editor.
    Leading,
    /// Right of the editor.
    Trailing,
}

impl Edge {
    /// Returns the axis along which a split toward this edge lays out
    /// the two editors.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Leading | Self::Trailing => Axis::Horizontal,
            Self::Top | Self::Bottom => Axis::Vertical,
        }
    }

    /// Returns true if the new editor goes before the existing one.
    #[must_use]
    pub const fn places_first(self) -> bool {
        matches!(self, Self::Top | Self::Leading)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
            Self::Leading => write!(f, "leading"),
            Self::Trailing => write!(f, "trailing"),
        }
    }
}
