//! Markers an edit cuts loose from their delimiter.

use std::collections::BTreeSet;
use std::ops::Range;

use super::{marker_range, BEGIN_MARKER, END_MARKER, MARKER_LEN};
use crate::syntax::{delimiter_at, BlockKind, DelimiterKind, Side};
use crate::text::{Assoc, Change, ChangeSet, ChangedRange, Document};

/// Deletions, in `post` coordinates, for markers that `changes` leaves without
/// the delimiter they belong to.
///
/// `changes` turns `pre` into `post`. Every marker attached in `pre` on a line
/// the edit touched, and on any line a new code block swallowed, is followed
/// through the edit. A marker that survives untouched but no longer sits next
/// to a delimiter of its own kind is removed. Markers the edit itself cut into
/// are left to the edit.
pub fn plan_detached(pre: &Document, changes: &ChangeSet, post: &Document) -> Vec<Change> {
    let changed = changes.iter_changes();
    if changed.is_empty() {
        return Vec::new();
    }

    let mut lines = BTreeSet::new();
    for range in &changed {
        let first = pre.line_at(range.from_a).number;
        let last = pre.line_at(range.to_a).number;
        lines.extend(first..=last);
    }
    lines.extend(swallowed_lines(pre, changes, post));

    let mut plan = Vec::new();
    for number in lines {
        let line = pre.line(number);
        for node in pre.line_nodes(&line) {
            let Some(marker) = marker_range(pre, &node) else {
                continue;
            };
            if changed.iter().any(|range| cuts(range, &marker)) {
                continue;
            }
            let at = changes.map_pos(marker.start, Assoc::After);
            let begin = marker.start == node.to;
            if !attached(post, at, begin) {
                plan.push(Change::delete(at, at + MARKER_LEN));
            }
        }
    }

    if !plan.is_empty() {
        tracing::debug!(markers = plan.len(), "dropping detached markers");
    }
    plan
}

/// Lines of `pre` that sit inside a code block of `post` that `pre` does not
/// have. The lexer no longer sees their delimiters.
fn swallowed_lines(pre: &Document, changes: &ChangeSet, post: &Document) -> Vec<usize> {
    let new_blocks = post.block_ranges(BlockKind::CodeBlock);
    if new_blocks.is_empty() {
        return Vec::new();
    }
    let old_blocks = pre.block_ranges(BlockKind::CodeBlock);
    let back = changes.invert(pre.rope());

    let mut lines = Vec::new();
    for block in new_blocks {
        let start = back.map_pos(block.start, Assoc::Before);
        let end = back.map_pos(block.end, Assoc::After);
        if old_blocks.contains(&(start..end)) {
            continue;
        }
        lines.extend(pre.line_at(start).number..=pre.line_at(end).number);
    }
    lines
}

/// Whether a changed region deletes part of `marker` or inserts inside it.
/// Text inserted at either edge leaves the marker whole.
fn cuts(range: &ChangedRange, marker: &Range<usize>) -> bool {
    if range.from_a == range.to_a {
        marker.start < range.from_a && range.from_a < marker.end
    } else {
        range.from_a < marker.end && marker.start < range.to_a
    }
}

/// Whether the marker text at `at` still sits next to a delimiter of the
/// matching kind
fn attached(doc: &Document, at: usize, begin: bool) -> bool {
    let text = doc.slice(at, at + MARKER_LEN);
    let delimiter = if begin {
        (text == BEGIN_MARKER).then(|| delimiter_at(doc, at, Side::Before))
    } else {
        (text == END_MARKER).then(|| delimiter_at(doc, at + MARKER_LEN, Side::After))
    };
    match delimiter.flatten() {
        Some(d) if begin => d.kind == DelimiterKind::Begin,
        Some(d) => d.kind == DelimiterKind::End,
        None => false,
    }
}
