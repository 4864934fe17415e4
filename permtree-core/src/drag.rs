// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drag-and-drop reordering.
//!
//! The presentation layer reports where a drag started and where it ended, [`DragState`] decides
//! whether the drop is a valid reorder and applies it through [`move_sibling`].
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forest::Forest;
use crate::tree::{Level, move_sibling};

/// A draggable sibling: a node (by slug) or an action (by code) at a given level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragItem {
    pub level: Level,
    pub key: String,
}

impl DragItem {
    pub fn new(level: Level, key: impl Into<String>) -> Self {
        Self {
            level,
            key: key.into(),
        }
    }

    pub fn group(slug: impl Into<String>) -> Self {
        Self::new(Level::Root, slug)
    }

    pub fn child(parent: impl Into<String>, slug: impl Into<String>) -> Self {
        Self::new(Level::Children(parent.into()), slug)
    }

    pub fn action(slug: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(Level::Actions(slug.into()), code)
    }
}

/// Item currently being dragged, if any.
#[derive(Clone, Debug, Default)]
pub struct DragState {
    dragging: Option<DragItem>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, item: DragItem) {
        self.dragging = Some(item);
    }

    pub fn dragging(&self) -> Option<&DragItem> {
        self.dragging.as_ref()
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
    }

    /// Drop the dragged item onto `target`.
    ///
    /// A reorder only happens when both items are different siblings at the same level, that is
    /// the same parent and the same kind. Everything else is rejected silently with `None`. The
    /// drag ends with every drop, accepted or not.
    pub fn drop_on(&mut self, forest: &Forest, target: &DragItem) -> Option<Forest> {
        let dragged = self.dragging.take()?;

        if dragged.level != target.level || dragged.key == target.key {
            debug!(dragged = %dragged.key, target = %target.key, "drop rejected");
            return None;
        }

        move_sibling(forest, &target.level, &dragged.key, &target.key)
    }
}
