//! Planning for typed input.

use super::{
    collapse_from_begin, collapse_from_end, has_begin_marker, has_end_marker, BEGIN_MARKER,
    END_MARKER, OPEN_WITH_MARKER,
};
use crate::syntax::{delimiter_at, DelimiterKind, Side};
use crate::text::{Change, ChangeSet, EditorState};

/// Marker edits for an input transaction, given its start state and changes.
///
/// For each selection range the nearest `$` before the range and the nearest
/// `$` at or after it (both on the range's line) decide what happens:
///
/// | delimiter             | marker  | action                            |
/// |-----------------------|---------|-----------------------------------|
/// | before, Begin         | absent  | add the begin marker              |
/// | before, End           | present | collapse the span                 |
/// | after, End            | absent  | add the end marker                |
/// | after, Begin          | present | collapse the span                 |
///
/// When the typed text lands right after an unmarked opening `$`, the `$`
/// itself is replaced by `${} ` so the marker ends up in front of the typed
/// text rather than behind it.
///
/// Text that contains a `$`, a backslash or a backtick pairs the line up
/// anew, so it adds no markers; the next keystroke sees the new pairing.
pub fn plan_insertion(state: &EditorState, changes: &ChangeSet) -> Vec<Change> {
    let doc = &state.doc;
    let mut plan = Vec::new();
    let adds = !changes
        .iter_changes()
        .iter()
        .any(|range| range.inserted.contains(|c: char| matches!(c, '$' | '\\' | '`')));

    for range in state.selection.ranges() {
        let line = doc.line_at(range.from());
        if let Some(prev) = line.rfind_before('$', range.from()) {
            match delimiter_at(doc, prev, Side::After) {
                Some(d)
                    if adds && d.kind == DelimiterKind::Begin && !has_begin_marker(doc, d.to) =>
                {
                    if d.to == range.from() && changes.starts_change_at(range.from()) {
                        plan.push(Change::replace(d.from, d.to, OPEN_WITH_MARKER));
                    } else {
                        plan.push(Change::insert(d.to, BEGIN_MARKER));
                    }
                }
                Some(d) if d.kind == DelimiterKind::End && has_end_marker(doc, d.from) => {
                    plan.extend(collapse_from_end(doc, &line, d.from));
                }
                _ => {}
            }
        }

        let line = doc.line_at(range.to());
        if let Some(next) = line.find_from('$', range.to()) {
            match delimiter_at(doc, next, Side::After) {
                Some(d)
                    if adds && d.kind == DelimiterKind::End && !has_end_marker(doc, d.from) =>
                {
                    plan.push(Change::insert(d.from, END_MARKER));
                }
                Some(d) if d.kind == DelimiterKind::Begin && has_begin_marker(doc, d.to) => {
                    plan.extend(collapse_from_begin(doc, &line, d.to));
                }
                _ => {}
            }
        }
    }

    if !plan.is_empty() {
        tracing::trace!(edits = plan.len(), "insertion plan");
    }
    plan
}
