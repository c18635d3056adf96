//! Visibility layer: hides markers and makes them atomic
//!
//! Rebuilt from scratch for the visible lines on every document change or
//! scroll. For a marked opening `$` at `d`:
//!
//! ```text
//!   $ { } ␠ x      decoration (hidden)  d+1 .. d+4
//!   └──┬──┘        atomic span          d   .. d+4
//! ```
//!
//! and the mirror image for a marked closing `$`.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::config::Settings;
use crate::markers::{has_begin_marker, has_end_marker, MARKER_LEN};
use crate::syntax::{classify, DelimiterKind};
use crate::text::Document;

/// Direction of a cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// A zero-width replacement over a marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityLayer {
    show_decorations: bool,
    atomic: bool,
    decorations: Vec<Decoration>,
    atomic_ranges: Vec<Range<usize>>,
}

impl VisibilityLayer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            show_decorations: !settings.disable_decorations,
            atomic: !settings.disable_atomic_ranges,
            decorations: Vec::new(),
            atomic_ranges: Vec::new(),
        }
    }

    /// Take new toggles. The caller rebuilds with [`update`](Self::update).
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.show_decorations = !settings.disable_decorations;
        self.atomic = !settings.disable_atomic_ranges;
    }

    /// Rebuild for the lines touched by `visible` (byte ranges)
    pub fn update(&mut self, doc: &Document, visible: &[Range<usize>]) {
        self.decorations.clear();
        self.atomic_ranges.clear();

        let lines: BTreeSet<usize> = visible
            .iter()
            .flat_map(|range| {
                let first = doc.line_at(range.start).number;
                let last = doc.line_at(range.end).number;
                first..=last
            })
            .collect();

        for number in lines {
            let line = doc.line(number);
            for node in doc.line_nodes(&line) {
                let (hidden, atomic) = match classify(&node, doc) {
                    DelimiterKind::Begin if has_begin_marker(doc, node.to) => (
                        node.to..node.to + MARKER_LEN,
                        node.from..node.to + MARKER_LEN,
                    ),
                    DelimiterKind::End if has_end_marker(doc, node.from) => (
                        node.from - MARKER_LEN..node.from,
                        node.from - MARKER_LEN..node.to,
                    ),
                    _ => continue,
                };
                if self.show_decorations {
                    self.decorations.push(Decoration { range: hidden });
                }
                if self.atomic {
                    self.atomic_ranges.push(atomic);
                }
            }
        }
        tracing::trace!(
            decorations = self.decorations.len(),
            atomic = self.atomic_ranges.len(),
            "visibility rebuilt"
        );
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn atomic_ranges(&self) -> &[Range<usize>] {
        &self.atomic_ranges
    }

    /// Move `pos` out of any atomic span it sits strictly inside, to the edge
    /// in the direction of travel
    pub fn skip_atomic(&self, pos: usize, direction: Direction) -> usize {
        match self
            .atomic_ranges
            .iter()
            .find(|range| range.start < pos && pos < range.end)
        {
            Some(range) => match direction {
                Direction::Backward => range.start,
                Direction::Forward => range.end,
            },
            None => pos,
        }
    }

    /// Grow a deletion range so it never removes part of an atomic span
    pub fn expand_deletion(&self, range: Range<usize>) -> Range<usize> {
        let (start, end) = (range.start, range.end);
        self.atomic_ranges
            .iter()
            .filter(|span| span.start < end && start < span.end)
            .fold(range, |acc, span| {
                acc.start.min(span.start)..acc.end.max(span.end)
            })
    }

    /// Text of `range` as displayed: decorated markers are left out
    pub fn render(&self, doc: &Document, range: Range<usize>) -> String {
        let mut out = String::new();
        let mut pos = range.start;
        for decoration in &self.decorations {
            let hidden = &decoration.range;
            if hidden.end <= pos || hidden.start >= range.end {
                continue;
            }
            out.push_str(&doc.slice(pos, hidden.start.max(pos)));
            pos = hidden.end;
        }
        if pos < range.end {
            out.push_str(&doc.slice(pos, range.end));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_for(text: &str, settings: &Settings) -> (Document, VisibilityLayer) {
        let doc = Document::new(text);
        let mut layer = VisibilityLayer::new(settings);
        layer.update(&doc, &[0..doc.len()]);
        (doc, layer)
    }

    #[test]
    fn test_spans_cover_delimiter_and_marker() {
        let (_, layer) = layer_for("${} x {}$", &Settings::default());
        assert_eq!(layer.atomic_ranges(), &[0..4, 5..9]);
        assert_eq!(
            layer.decorations(),
            &[Decoration { range: 1..4 }, Decoration { range: 5..8 }]
        );
    }

    #[test]
    fn test_unmarked_math_is_plain() {
        let (_, layer) = layer_for("$x$ and ${} y$", &Settings::default());
        assert_eq!(layer.atomic_ranges(), &[8..12]);
    }

    #[test]
    fn test_only_visible_lines() {
        let text = "${} a {}$\n\n${} b {}$";
        let doc = Document::new(text);
        let mut layer = VisibilityLayer::new(&Settings::default());
        layer.update(&doc, &[11..12]);
        assert_eq!(layer.atomic_ranges(), &[11..15, 16..20]);
        layer.update(&doc, &[]);
        assert!(layer.atomic_ranges().is_empty());
    }

    #[test]
    fn test_toggles() {
        let settings = Settings {
            disable_decorations: true,
            ..Settings::default()
        };
        let (doc, mut layer) = layer_for("${} x {}$", &settings);
        assert!(layer.decorations().is_empty());
        assert_eq!(layer.atomic_ranges().len(), 2);

        let settings = Settings {
            disable_atomic_ranges: true,
            ..Settings::default()
        };
        layer.apply_settings(&settings);
        layer.update(&doc, &[0..doc.len()]);
        assert_eq!(layer.decorations().len(), 2);
        assert!(layer.atomic_ranges().is_empty());
    }

    #[test]
    fn test_skip_atomic() {
        let (_, layer) = layer_for("${} x {}$", &Settings::default());
        assert_eq!(layer.skip_atomic(2, Direction::Forward), 4);
        assert_eq!(layer.skip_atomic(2, Direction::Backward), 0);
        assert_eq!(layer.skip_atomic(4, Direction::Backward), 4);
        assert_eq!(layer.skip_atomic(7, Direction::Forward), 9);
    }

    #[test]
    fn test_expand_deletion() {
        let (_, layer) = layer_for("${} x {}$", &Settings::default());
        assert_eq!(layer.expand_deletion(3..4), 0..4);
        assert_eq!(layer.expand_deletion(4..5), 4..5);
        assert_eq!(layer.expand_deletion(8..9), 5..9);
        assert_eq!(layer.expand_deletion(0..9), 0..9);
    }

    #[test]
    fn test_render_hides_markers() {
        let (doc, layer) = layer_for("a ${} x {}$ b", &Settings::default());
        assert_eq!(layer.render(&doc, 0..doc.len()), "a $x$ b");
        assert_eq!(layer.render(&doc, 4..13), "x$ b");
    }
}
