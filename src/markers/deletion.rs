//! Planning for deletions.

use super::{marker_deletions, MARKER_LEN};
use crate::text::{Change, EditorState};

/// Marker removals for a deletion, planned from its start state.
///
/// For each selection range, look for a `$` in a short window behind the
/// caret (or inside the selection). If there is one, every marker attached to
/// a delimiter between the nearest `$` at or before the window start and the
/// next `$` after the found one is removed, so emptying a span also removes
/// its scaffolding in the same keystroke.
pub fn plan_deletion(state: &EditorState) -> Vec<Change> {
    let doc = &state.doc;
    let mut plan = Vec::new();

    for range in state.selection.ranges() {
        let (from, to) = if range.is_empty() {
            (range.from().saturating_sub(MARKER_LEN + 1), range.to())
        } else {
            (range.from(), range.to())
        };
        let Some(found) = doc.rfind_in(b'$', from, to) else {
            continue;
        };

        let next = doc.find_from(b'$', found + 1);
        let prev = doc
            .line_at(from)
            .rfind_before('$', from + 1)
            .unwrap_or(found);

        let nodes = doc.nodes_in(prev, next.unwrap_or(to));
        plan.extend(marker_deletions(doc, &nodes));
    }

    if !plan.is_empty() {
        tracing::trace!(edits = plan.len(), "deletion plan");
    }
    plan
}
