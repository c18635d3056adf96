//! Selection types: ranges with an anchor and a head, in byte offsets.

use super::change::{Assoc, ChangeSet};

/// A text selection with anchor (start point) and head (cursor position).
/// The anchor stays fixed while the head moves during selection extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionRange {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the cursor is (moving point)
    pub head: usize,
}

impl SelectionRange {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor with no selection)
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Check if selection is empty (anchor == head)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Lower bound of the range
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound of the range
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if selection is reversed (head before anchor)
    pub fn is_reversed(&self) -> bool {
        self.head < self.anchor
    }

    /// Check if a position is within this selection (end exclusive)
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.from() && pos < self.to()
    }

    /// Map through a change set. Cursors stay before text inserted at their
    /// position; non-empty ranges shrink away from insertions at their edges.
    pub fn map(&self, changes: &ChangeSet) -> Self {
        if self.is_empty() {
            return Self::cursor(changes.map_pos(self.head, Assoc::Before));
        }
        let from = changes.map_pos(self.from(), Assoc::After);
        let to = changes.map_pos(self.to(), Assoc::Before).max(from);
        if self.is_reversed() {
            Self::new(to, from)
        } else {
            Self::new(from, to)
        }
    }

    fn clamp(&self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.head.min(len))
    }
}

/// One or more selection ranges, one of which is the main range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSelection {
    ranges: Vec<SelectionRange>,
    main: usize,
}

impl Default for EditorSelection {
    fn default() -> Self {
        Self::cursor(0)
    }
}

impl EditorSelection {
    /// Build a selection from ranges. Ranges are sorted by position and exact
    /// duplicates dropped; `main` follows its range through the sort.
    pub fn create(ranges: Vec<SelectionRange>, main: usize) -> Self {
        if ranges.is_empty() {
            return Self::cursor(0);
        }
        let main_range = ranges[main.min(ranges.len() - 1)];
        let mut ranges = ranges;
        ranges.sort_by_key(|range| (range.from(), range.to()));
        ranges.dedup();
        let main = ranges
            .iter()
            .position(|range| *range == main_range)
            .unwrap_or(0);
        Self { ranges, main }
    }

    /// A single range
    pub fn single(anchor: usize, head: usize) -> Self {
        Self {
            ranges: vec![SelectionRange::new(anchor, head)],
            main: 0,
        }
    }

    /// A single cursor
    pub fn cursor(pos: usize) -> Self {
        Self::single(pos, pos)
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn main(&self) -> SelectionRange {
        self.ranges[self.main]
    }

    pub fn main_index(&self) -> usize {
        self.main
    }

    /// Map every range through a change set
    pub fn map(&self, changes: &ChangeSet) -> Self {
        Self::create(
            self.ranges.iter().map(|range| range.map(changes)).collect(),
            self.main,
        )
    }

    /// Clamp every range to a document of `len` bytes
    pub fn clamp(&self, len: usize) -> Self {
        Self::create(
            self.ranges.iter().map(|range| range.clamp(len)).collect(),
            self.main,
        )
    }
}
