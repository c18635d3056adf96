//! Marker policy: the edits that keep hidden markers in step with the text.
//!
//! A begin marker `{} ` sits right after an opening `$`, an end marker ` {}`
//! right before a closing `$`. Every planner here is a pure function of the
//! pre-edit state and returns [`Change`]s in pre-edit coordinates; a failed
//! scan means "nothing to do", never an error.

mod cleanup;
mod deletion;
mod detached;
mod insertion;
mod selection;

pub use cleanup::{clean_text, cleanup_transaction, plan_cleanup, CLEANUP_EVENT};
pub use deletion::plan_deletion;
pub use detached::plan_detached;
pub use insertion::plan_insertion;
pub use selection::plan_selection;

use std::ops::Range;

use crate::syntax::{classify, delimiter_at, DelimiterKind, Side, SyntaxNode};
use crate::text::{Change, Document, Line};

/// Marker placed right after an opening `$`
pub const BEGIN_MARKER: &str = "{} ";
/// Marker placed right before a closing `$`
pub const END_MARKER: &str = " {}";
/// Width of either marker in bytes
pub const MARKER_LEN: usize = 3;

/// Opening delimiter followed by its marker
pub const OPEN_WITH_MARKER: &str = "${} ";
/// Closing delimiter preceded by its marker
pub const CLOSE_WITH_MARKER: &str = " {}$";

/// Whether the begin marker follows a delimiter ending at `delimiter_to`
pub fn has_begin_marker(doc: &Document, delimiter_to: usize) -> bool {
    doc.slice(delimiter_to, delimiter_to + MARKER_LEN) == BEGIN_MARKER
}

/// Whether the end marker precedes a delimiter starting at `delimiter_from`
pub fn has_end_marker(doc: &Document, delimiter_from: usize) -> bool {
    delimiter_from >= MARKER_LEN
        && doc.slice(delimiter_from - MARKER_LEN, delimiter_from) == END_MARKER
}

/// Range of the marker attached to `node`, if it is a delimiter carrying one
pub fn marker_range(doc: &Document, node: &SyntaxNode) -> Option<Range<usize>> {
    match classify(node, doc) {
        DelimiterKind::Begin if has_begin_marker(doc, node.to) => {
            Some(node.to..node.to + MARKER_LEN)
        }
        DelimiterKind::End if has_end_marker(doc, node.from) => {
            Some(node.from - MARKER_LEN..node.from)
        }
        _ => None,
    }
}

/// Deletions for every marker attached to `nodes`
fn marker_deletions<'a>(
    doc: &'a Document,
    nodes: impl IntoIterator<Item = &'a SyntaxNode> + 'a,
) -> impl Iterator<Item = Change> + 'a {
    nodes
        .into_iter()
        .filter_map(move |node| marker_range(doc, node))
        .map(|range| Change::delete(range.start, range.end))
}

/// Collapse the span closed by the marked End delimiter starting at `end_from`:
/// both markers go and the body loses the padding around it.
fn collapse_from_end(doc: &Document, line: &Line, end_from: usize) -> Option<Change> {
    let marker_start = end_from.checked_sub(MARKER_LEN)?;
    let open = line.rfind_str_before(OPEN_WITH_MARKER, marker_start)?;
    if delimiter_at(doc, open, Side::After)?.kind != DelimiterKind::Begin {
        return None;
    }
    let body = doc.slice(open + OPEN_WITH_MARKER.len(), marker_start);
    Some(Change::replace(open + 1, end_from, body.trim()))
}

/// Collapse the span opened by the marked Begin delimiter ending at `begin_to`
fn collapse_from_begin(doc: &Document, line: &Line, begin_to: usize) -> Option<Change> {
    let body_start = begin_to + MARKER_LEN;
    let close = line.find_str_from(CLOSE_WITH_MARKER, body_start)?;
    let end_from = close + MARKER_LEN;
    if delimiter_at(doc, end_from, Side::After)?.kind != DelimiterKind::End {
        return None;
    }
    let body = doc.slice(body_start, close);
    Some(Change::replace(begin_to, end_from, body.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_presence() {
        let doc = Document::new("${} x {}$");
        assert!(has_begin_marker(&doc, 1));
        assert!(has_end_marker(&doc, 8));
        assert!(!has_begin_marker(&doc, 8));
        assert!(!has_end_marker(&doc, 2));
    }

    #[test]
    fn test_end_marker_never_scans_below_zero() {
        let doc = Document::new("{}$");
        assert!(!has_end_marker(&doc, 2));
        assert!(!has_end_marker(&doc, 0));
    }

    #[test]
    fn test_marker_range() {
        let doc = Document::new("a ${} x {}$");
        let nodes = doc.nodes_in(0, doc.len());
        let ranges: Vec<_> = nodes.iter().filter_map(|n| marker_range(&doc, n)).collect();
        assert_eq!(ranges, vec![3..6, 7..10]);
    }

    #[test]
    fn test_collapse_from_both_sides() {
        let doc = Document::new("${} ab {}$");
        let line = doc.line_at(0);
        assert_eq!(collapse_from_end(&doc, &line, 9), Some(Change::replace(1, 9, "ab")));
        assert_eq!(collapse_from_begin(&doc, &line, 1), Some(Change::replace(1, 9, "ab")));
    }

    #[test]
    fn test_collapse_needs_both_markers_on_the_line() {
        let doc = Document::new("$ab {}$");
        let line = doc.line_at(0);
        assert_eq!(collapse_from_end(&doc, &line, 6), None);

        let doc = Document::new("${} ab$");
        let line = doc.line_at(0);
        assert_eq!(collapse_from_begin(&doc, &line, 1), None);
    }
}
