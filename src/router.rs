//! Edit-event router
//!
//! Every transaction passes through [`Router::filter`] before it is applied:
//!
//! ```text
//! Transaction ─→ exclusion guard ─→ classify ─┬─ Insert ──→ plan_insertion ─┐
//!                 (table/code)                ├─ Delete ──→ plan_deletion  ─┼─→ augment
//!                                             ├─ Select ──→ plan_selection ─┘
//!                                             ├─ Unlabeled → compat::adapt (replaces)
//!                                             └─ External ─→ unchanged
//! ```
//!
//! Planner edits are merged into the incoming transaction, so the user's edit
//! and its marker bookkeeping land (and undo) together. Markers the merged
//! edit leaves without their delimiter are removed in the same transaction.

use crate::compat::{self, Adapter};
use crate::config::Settings;
use crate::markers::{plan_deletion, plan_detached, plan_insertion, plan_selection};
use crate::syntax::BlockKind;
use crate::text::{Change, ChangeSet, EditorState, Transaction};

/// Why a transaction was produced, from the root of its user event tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `input…`: typing, pasting, completion
    Insert,
    /// `delete…`
    Delete,
    /// `select…` carrying a new selection
    Select,
    /// Any other tag
    External,
    /// No tag at all
    Unlabeled,
}

impl EventKind {
    pub fn of(tr: &Transaction) -> Self {
        match tr.user_event_root() {
            None => EventKind::Unlabeled,
            Some("input") => EventKind::Insert,
            Some("delete") => EventKind::Delete,
            Some("select") if tr.selection.is_some() => EventKind::Select,
            Some(_) => EventKind::External,
        }
    }
}

/// A phase of a multi-transaction protocol, remembered for exactly one
/// following transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPhase {
    /// Box-wrap replaced the span; its cursor move comes next
    BoxWrapCursor,
}

/// What the router did with the last transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The selection was in an excluded block; passed through
    Excluded(BlockKind),
    /// Input during composition; passed through
    Composing,
    /// Planned by the marker policy (possibly with nothing to add)
    Policy(EventKind),
    /// Replaced by a compatibility adapter
    Adapted(Adapter),
    /// Nothing applies; passed through
    PassThrough(EventKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Guards {
    tables: bool,
    code_blocks: bool,
    composition: bool,
}

impl Guards {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            tables: settings.disable_in_tables,
            code_blocks: settings.disable_in_code_blocks,
            composition: settings.disable_during_composition,
        }
    }

    fn excludes(&self, kind: BlockKind) -> bool {
        match kind {
            BlockKind::Table => self.tables,
            BlockKind::CodeBlock => self.code_blocks,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    guards: Guards,
    pending: Option<PendingPhase>,
    last_route: Option<Route>,
}

impl Router {
    pub fn new(settings: &Settings) -> Self {
        Self {
            guards: Guards::from_settings(settings),
            pending: None,
            last_route: None,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.guards = Guards::from_settings(settings);
    }

    /// Phase latched for the next transaction
    pub fn pending(&self) -> Option<PendingPhase> {
        self.pending
    }

    pub fn last_route(&self) -> Option<Route> {
        self.last_route
    }

    /// Rewrite `tr`, proposed against `state`, before it is applied.
    ///
    /// The latched phase only survives one call: it is taken here whatever
    /// the outcome, and only an adapter can set it again.
    pub fn filter(&mut self, state: &EditorState, tr: Transaction) -> Transaction {
        let pending = self.pending.take();
        let kind = EventKind::of(&tr);
        let (route, tr) = self.route(state, tr, kind, pending);
        tracing::debug!(?kind, ?route, event = tr.user_event.as_deref(), "filter");
        self.last_route = Some(route);
        tr
    }

    fn route(
        &mut self,
        state: &EditorState,
        tr: Transaction,
        kind: EventKind,
        pending: Option<PendingPhase>,
    ) -> (Route, Transaction) {
        if let Some(block) = self.excluded_block(state) {
            return (Route::Excluded(block), tr);
        }

        match kind {
            EventKind::Insert if tr.composing && self.guards.composition => (Route::Composing, tr),
            EventKind::Insert => {
                let plan = plan_insertion(state, &tr.changes);
                (Route::Policy(kind), merge(state, tr, plan))
            }
            EventKind::Delete => {
                let plan = plan_deletion(state);
                (Route::Policy(kind), merge(state, tr, plan))
            }
            // selection planning reads positions in the start document
            EventKind::Select if tr.doc_changed() => (Route::PassThrough(kind), tr),
            EventKind::Select => {
                let plan = match &tr.selection {
                    Some(selection) => plan_selection(state, selection),
                    None => Vec::new(),
                };
                (Route::Policy(kind), merge(state, tr, plan))
            }
            EventKind::Unlabeled => match compat::adapt(state, &tr, pending) {
                Some(adapted) => {
                    self.pending = adapted.pending;
                    (Route::Adapted(adapted.adapter), adapted.transaction)
                }
                None => (Route::PassThrough(kind), tr),
            },
            EventKind::External => (Route::PassThrough(kind), tr),
        }
    }

    /// Excluded block under any selection head, per the guards
    fn excluded_block(&self, state: &EditorState) -> Option<BlockKind> {
        state.selection.ranges().iter().find_map(|range| {
            let line = state.doc.line_at(range.head);
            state
                .doc
                .block_at_line(line.number)
                .filter(|kind| self.guards.excludes(*kind))
        })
    }
}

/// Fold the planned edits into `tr`, then drop any marker the combined edit
/// cut loose from its delimiter
fn merge(state: &EditorState, tr: Transaction, plan: Vec<Change>) -> Transaction {
    let tr = if plan.is_empty() {
        tr
    } else {
        tr.augment(ChangeSet::of(state.doc.len(), plan))
    };
    if !tr.doc_changed() {
        return tr;
    }

    // dropping a marker can pair its line up differently again
    let mut tr = tr;
    let mut pre = state.doc.clone();
    let mut changes = tr.changes.clone();
    loop {
        let post = pre.apply(&changes);
        let detached = plan_detached(&pre, &changes, &post);
        if detached.is_empty() {
            return tr;
        }
        changes = ChangeSet::of(post.len(), detached);
        tr = tr.then(changes.clone());
        pre = post;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::EditorSelection;

    fn typing(state: &EditorState, at: usize, text: &str) -> Transaction {
        Transaction::new(ChangeSet::of(state.doc.len(), [Change::insert(at, text)]))
            .with_selection(EditorSelection::cursor(at + text.len()))
            .with_user_event("input.type")
    }

    #[test]
    fn test_event_kinds() {
        let base = Transaction::new(ChangeSet::empty(0));
        assert_eq!(EventKind::of(&base), EventKind::Unlabeled);
        assert_eq!(EventKind::of(&base.clone().with_user_event("input.paste")), EventKind::Insert);
        assert_eq!(EventKind::of(&base.clone().with_user_event("delete.backward")), EventKind::Delete);
        assert_eq!(EventKind::of(&base.clone().with_user_event("select.pointer")), EventKind::External);
        assert_eq!(
            EventKind::of(&base.clone().with_user_event("select").with_selection(EditorSelection::cursor(0))),
            EventKind::Select
        );
        assert_eq!(EventKind::of(&base.with_user_event("undo")), EventKind::External);
    }

    #[test]
    fn test_insert_is_augmented() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("$$").with_selection(EditorSelection::cursor(1));
        let tr = router.filter(&state, typing(&state, 1, "x"));
        assert_eq!(state.apply(&tr).doc.text(), "${} x {}$");
        assert_eq!(router.last_route(), Some(Route::Policy(EventKind::Insert)));
    }

    #[test]
    fn test_delete_drops_partner_marker() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("a ${} cx {}$ b").with_selection(EditorSelection::cursor(8));
        let tr = Transaction::new(ChangeSet::of(state.doc.len(), [Change::delete(8, 12)]))
            .with_selection(EditorSelection::cursor(8))
            .with_user_event("delete.forward");
        let next = state.apply(&router.filter(&state, tr));
        assert_eq!(next.doc.text(), "a $cx b");
        assert_eq!(next.selection.main().head, 5);
    }

    #[test]
    fn test_composition_guard() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("$$").with_selection(EditorSelection::cursor(1));
        let tr = router.filter(&state, typing(&state, 1, "x").with_composing(true));
        assert_eq!(state.apply(&tr).doc.text(), "$x$");
        assert_eq!(router.last_route(), Some(Route::Composing));

        let settings = Settings {
            disable_during_composition: false,
            ..Settings::default()
        };
        router.apply_settings(&settings);
        let tr = router.filter(&state, typing(&state, 1, "x").with_composing(true));
        assert_eq!(state.apply(&tr).doc.text(), "${} x {}$");
    }

    #[test]
    fn test_table_guard() {
        let text = "| a |\n|---|\n| $$ |\n";
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new(text).with_selection(EditorSelection::cursor(15));
        let tr = router.filter(&state, typing(&state, 15, "x"));
        assert_eq!(state.apply(&tr).doc.text(), "| a |\n|---|\n| $x$ |\n");
        assert_eq!(router.last_route(), Some(Route::Excluded(BlockKind::Table)));
    }

    #[test]
    fn test_external_passes_through() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("$$").with_selection(EditorSelection::cursor(1));
        let tr = Transaction::new(ChangeSet::of(2, [Change::insert(1, "x")])).with_user_event("mathveil.cleanup");
        let out = router.filter(&state, tr.clone());
        assert_eq!(out, tr);
        assert_eq!(router.last_route(), Some(Route::PassThrough(EventKind::External)));
    }

    #[test]
    fn test_box_wrap_latch_lasts_one_transaction() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("${} a {}$");
        let wrap = Transaction::new(ChangeSet::of(9, [Change::replace(1, 8, "\\boxed{{} a {}}")]));
        let wrapped = router.filter(&state, wrap);
        assert_eq!(router.pending(), Some(PendingPhase::BoxWrapCursor));
        let state = state.apply(&wrapped);
        assert_eq!(state.doc.text(), "$\\boxed{a}$");

        // an unrelated edit clears the latch
        let other = Transaction::new(ChangeSet::of(state.doc.len(), [Change::insert(0, " ")]))
            .with_user_event("input.type");
        let state = state.apply(&router.filter(&state, other));
        assert_eq!(router.pending(), None);

        let move_only = Transaction::select(state.doc.len(), EditorSelection::cursor(5));
        let out = router.filter(&state, move_only);
        assert_eq!(out.selection.unwrap().main().head, 5);
        assert_eq!(router.last_route(), Some(Route::PassThrough(EventKind::Unlabeled)));
    }

    #[test]
    fn test_box_wrap_second_phase() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("${} a {}$");
        let wrap = Transaction::new(ChangeSet::of(9, [Change::replace(1, 8, "\\boxed{{} a {}}")]));
        let state = state.apply(&router.filter(&state, wrap));

        let cursor = Transaction::select(state.doc.len(), EditorSelection::cursor(13));
        let out = router.filter(&state, cursor);
        assert_eq!(out.selection.unwrap().main().head, 10);
        assert_eq!(router.last_route(), Some(Route::Adapted(Adapter::BoxWrap)));
        assert_eq!(router.pending(), None);
    }

    #[test]
    fn test_select_with_doc_change_passes_through() {
        let mut router = Router::new(&Settings::default());
        let state = EditorState::new("${} x {}$ y").with_selection(EditorSelection::cursor(5));
        let tr = Transaction::new(ChangeSet::of(11, [Change::insert(11, "z")]))
            .with_selection(EditorSelection::cursor(12))
            .with_user_event("select");
        let out = router.filter(&state, tr.clone());
        assert_eq!(out, tr);
    }
}
