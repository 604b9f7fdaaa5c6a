use std::collections::VecDeque;

use crate::raster::rendered::RenderedImage;
use crate::transform::placement::PlacementState;

/// Number of snapshots kept; older ones are evicted silently.
pub const UNDO_LIMIT: usize = 25;

/// Placement plus the design as it was rendered at that point.
#[derive(Clone, Debug, PartialEq)]
pub struct UndoEntry {
    pub placement: PlacementState,
    pub rendered: RenderedImage,
}

/// Bounded LIFO of [`UndoEntry`] values.
#[derive(Clone, Debug, Default)]
pub struct UndoHistory {
    entries: VecDeque<UndoEntry>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a snapshot, returning the evicted oldest entry when the history was full.
    pub fn push(&mut self, entry: UndoEntry) -> Option<UndoEntry> {
        self.entries.push_back(entry);
        if self.entries.len() > UNDO_LIMIT {
            return self.entries.pop_front();
        }
        None
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/history.rs"]
mod tests;
