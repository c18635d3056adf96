//! Planning for selection-only changes.

use super::{collapse_from_begin, collapse_from_end, has_begin_marker, has_end_marker};
use crate::syntax::{delimiter_at, DelimiterKind, Side};
use crate::text::{Change, EditorSelection, EditorState};

/// Collapses for a selection moving to `new_selection` without a text change.
///
/// When a range lands right after a marked closing `$` or right before a
/// marked opening `$` (nearest `$` on each side, same line), the span it left
/// is collapsed the same way typing next to it would.
pub fn plan_selection(state: &EditorState, new_selection: &EditorSelection) -> Vec<Change> {
    let doc = &state.doc;
    let mut plan = Vec::new();

    for range in new_selection.ranges() {
        let line_from = doc.line_at(range.from());
        if let Some(prev) = line_from.rfind_before('$', range.from()) {
            if let Some(d) = delimiter_at(doc, prev, Side::After) {
                if d.kind == DelimiterKind::End && has_end_marker(doc, d.from) {
                    plan.extend(collapse_from_end(doc, &line_from, d.from));
                }
            }
        }

        let line_to = doc.line_at(range.to());
        if let Some(next) = line_to.find_from('$', range.to()) {
            if let Some(d) = delimiter_at(doc, next, Side::After) {
                if d.kind == DelimiterKind::Begin && has_begin_marker(doc, d.to) {
                    plan.extend(collapse_from_begin(doc, &line_to, d.to));
                }
            }
        }
    }

    if !plan.is_empty() {
        tracing::trace!(edits = plan.len(), "selection plan");
    }
    plan
}
