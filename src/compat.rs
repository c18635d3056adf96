//! Adapters for unlabeled transactions from math-editing helpers
//!
//! Two helper features break on hidden markers:
//!
//! - *Box-wrap* wraps the current formula as `\boxed{…}`. It replaces the
//!   span body (markers included) in one transaction, then moves the cursor
//!   in a second, selection-only transaction.
//! - *Tab-escape* jumps the cursor to the closing `$`, which would leave it
//!   between the end marker and the delimiter.

use crate::markers::{has_end_marker, BEGIN_MARKER, END_MARKER, MARKER_LEN};
use crate::router::PendingPhase;
use crate::syntax::{delimiter_at, DelimiterKind, Side};
use crate::text::{Change, ChangeSet, EditorSelection, EditorState, SelectionRange, Transaction};

/// Text the box-wrap command puts before the wrapped formula
pub const BOX_OPEN: &str = "\\boxed{";
/// Text the box-wrap command puts after the wrapped formula
pub const BOX_CLOSE: &str = "}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    BoxWrap,
    TabEscape,
}

impl Adapter {
    /// Order in which adapters get to look at a transaction
    pub const ORDER: [Adapter; 2] = [Adapter::BoxWrap, Adapter::TabEscape];

    fn apply(
        self,
        state: &EditorState,
        tr: &Transaction,
        pending: Option<PendingPhase>,
    ) -> Option<Adapted> {
        match self {
            Adapter::BoxWrap => box_wrap(state, tr, pending),
            Adapter::TabEscape => tab_escape(state, tr),
        }
    }
}

/// A transaction rewritten by an adapter
#[derive(Debug, Clone, PartialEq)]
pub struct Adapted {
    pub adapter: Adapter,
    /// Replaces the incoming transaction
    pub transaction: Transaction,
    /// Phase to remember for the next transaction
    pub pending: Option<PendingPhase>,
}

/// Offer `tr` to each adapter in order; the first that recognizes it wins.
pub fn adapt(
    state: &EditorState,
    tr: &Transaction,
    pending: Option<PendingPhase>,
) -> Option<Adapted> {
    Adapter::ORDER
        .iter()
        .find_map(|adapter| adapter.apply(state, tr, pending))
}

fn box_wrap(
    state: &EditorState,
    tr: &Transaction,
    pending: Option<PendingPhase>,
) -> Option<Adapted> {
    match (&tr.selection, tr.doc_changed()) {
        (None, true) => {
            let change = box_wrap_replacement(state, &tr.changes)?;
            tracing::debug!(from = change.from, to = change.to, "box-wrap: stripping markers");
            Some(Adapted {
                adapter: Adapter::BoxWrap,
                transaction: Transaction::new(ChangeSet::of(state.doc.len(), [change])),
                pending: Some(PendingPhase::BoxWrapCursor),
            })
        }
        (Some(selection), false) if pending == Some(PendingPhase::BoxWrapCursor) => {
            let anchor = selection.main().anchor.saturating_sub(MARKER_LEN);
            Some(Adapted {
                adapter: Adapter::BoxWrap,
                transaction: Transaction::select(state.doc.len(), EditorSelection::cursor(anchor)),
                pending: None,
            })
        }
        _ => None,
    }
}

/// The wrap of a full marked span, redone without its markers
fn box_wrap_replacement(state: &EditorState, changes: &ChangeSet) -> Option<Change> {
    let doc = &state.doc;
    changes.iter_changes().into_iter().find_map(|c| {
        let old = doc.slice(c.from_a, c.to_a);
        if c.inserted != format!("{}{}{}", BOX_OPEN, old, BOX_CLOSE) {
            return None;
        }
        let begin = delimiter_at(doc, c.from_a, Side::Before)?;
        let end = delimiter_at(doc, c.to_a, Side::After)?;
        if begin.kind != DelimiterKind::Begin || end.kind != DelimiterKind::End {
            return None;
        }
        if !old.starts_with(BEGIN_MARKER) || !old.ends_with(END_MARKER) {
            return None;
        }
        let body = doc.slice(c.from_a + MARKER_LEN, c.to_a.saturating_sub(MARKER_LEN));
        Some(Change::replace(
            c.from_a,
            c.to_a,
            format!("{}{}{}", BOX_OPEN, body, BOX_CLOSE),
        ))
    })
}

fn tab_escape(state: &EditorState, tr: &Transaction) -> Option<Adapted> {
    let selection = tr.selection.as_ref()?;
    if tr.doc_changed() {
        return None;
    }
    let doc = &state.doc;
    let ranges: Vec<SelectionRange> = selection
        .ranges()
        .iter()
        .map(|range| {
            if !range.is_empty() {
                return *range;
            }
            match delimiter_at(doc, range.head, Side::After) {
                Some(d) if d.kind == DelimiterKind::End && has_end_marker(doc, d.from) => {
                    SelectionRange::cursor(d.to)
                }
                _ => *range,
            }
        })
        .collect();
    if ranges == selection.ranges() {
        return None;
    }
    tracing::debug!("tab-escape: moving cursor past closing delimiter");
    Some(Adapted {
        adapter: Adapter::TabEscape,
        transaction: tr
            .clone()
            .with_selection(EditorSelection::create(ranges, selection.main_index())),
        pending: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_escape_skips_end_marker() {
        let state = EditorState::new("${} content {}$ after");
        let tr = Transaction::select(state.doc.len(), EditorSelection::cursor(14));
        let adapted = adapt(&state, &tr, None).unwrap();
        assert_eq!(adapted.adapter, Adapter::TabEscape);
        assert_eq!(adapted.transaction.selection.unwrap().main().head, 15);
    }

    #[test]
    fn test_tab_escape_ignores_other_positions() {
        let state = EditorState::new("${} content {}$");
        for pos in [0, 4, 12] {
            let tr = Transaction::select(state.doc.len(), EditorSelection::cursor(pos));
            assert!(adapt(&state, &tr, None).is_none(), "pos {}", pos);
        }
        let unmarked = EditorState::new("$x$");
        let tr = Transaction::select(3, EditorSelection::cursor(2));
        assert!(adapt(&unmarked, &tr, None).is_none());
    }

    #[test]
    fn test_box_wrap_phase_one_strips_markers() {
        let text = "${} a+b {}$";
        let state = EditorState::new(text);
        let inner = "{} a+b {}";
        let tr = Transaction::new(ChangeSet::of(
            text.len(),
            [Change::replace(1, 10, format!("\\boxed{{{}}}", inner))],
        ));
        let adapted = adapt(&state, &tr, None).unwrap();
        assert_eq!(adapted.adapter, Adapter::BoxWrap);
        assert_eq!(adapted.pending, Some(PendingPhase::BoxWrapCursor));
        assert_eq!(state.apply(&adapted.transaction).doc.text(), "$\\boxed{a+b}$");
    }

    #[test]
    fn test_box_wrap_needs_markers_and_delimiters() {
        let state = EditorState::new("$a+b$");
        let tr = Transaction::new(ChangeSet::of(5, [Change::replace(1, 4, "\\boxed{a+b}")]));
        assert!(adapt(&state, &tr, None).is_none());

        let state = EditorState::new("${} a {}$");
        let tr = Transaction::new(ChangeSet::of(9, [Change::replace(1, 8, "\\fbox{{} a {}}")]));
        assert!(adapt(&state, &tr, None).is_none());
    }

    #[test]
    fn test_box_wrap_phase_two_shifts_cursor() {
        let state = EditorState::new("$\\boxed{a+b}$");
        let tr = Transaction::select(state.doc.len(), EditorSelection::cursor(13));
        let adapted = adapt(&state, &tr, Some(PendingPhase::BoxWrapCursor)).unwrap();
        assert_eq!(adapted.adapter, Adapter::BoxWrap);
        assert_eq!(adapted.pending, None);
        assert_eq!(adapted.transaction.selection.unwrap().main().head, 10);
    }

    #[test]
    fn test_phase_two_saturates_at_zero() {
        let state = EditorState::new("ab");
        let tr = Transaction::select(2, EditorSelection::cursor(1));
        let adapted = adapt(&state, &tr, Some(PendingPhase::BoxWrapCursor)).unwrap();
        assert_eq!(adapted.transaction.selection.unwrap().main().head, 0);
    }
}
