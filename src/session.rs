//! Headless editor session
//!
//! Drives the marker engine the way an editor view would: messages become
//! tagged transactions, every transaction goes through the router before it
//! is applied, applied edits are recorded for undo, and the visibility layer
//! is rebuilt whenever the document or the viewport changes.

use std::ops::Range;

use crate::config::Settings;
use crate::history::{EditHistory, HistoryEntry};
use crate::keymap::{KeyCode, Keystroke, Modifiers};
use crate::markers::cleanup_transaction;
use crate::messages::{Direction, DocumentMsg, EditorMsg, Msg};
use crate::router::Router;
use crate::tracing::SelectionSnapshot;
use crate::text::{
    Assoc, Change, ChangeSet, EditorSelection, EditorState, SelectionRange, Transaction,
};
use crate::visibility::{self, VisibilityLayer};

pub struct EditorSession {
    state: EditorState,
    router: Router,
    layer: VisibilityLayer,
    history: EditHistory,
    deletion_keys: Vec<Keystroke>,
    composing: bool,
    /// Visible byte range; `None` shows the whole document
    viewport: Option<Range<usize>>,
}

impl EditorSession {
    pub fn new(text: &str, settings: &Settings) -> Self {
        let mut session = Self {
            state: EditorState::new(text),
            router: Router::new(settings),
            layer: VisibilityLayer::new(settings),
            history: EditHistory::new(),
            deletion_keys: settings.deletion_keys.clone(),
            composing: false,
            viewport: None,
        };
        session.refresh();
        session
    }

    /// Place the selection without going through the router
    pub fn with_selection(mut self, selection: EditorSelection) -> Self {
        self.state = self.state.with_selection(selection);
        self
    }

    pub fn with_cursor(self, pos: usize) -> Self {
        self.with_selection(EditorSelection::cursor(pos))
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn text(&self) -> String {
        self.state.doc.text()
    }

    pub fn selection(&self) -> &EditorSelection {
        &self.state.selection
    }

    /// Head of the main selection range
    pub fn cursor(&self) -> usize {
        self.state.selection.main().head
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn layer(&self) -> &VisibilityLayer {
        &self.layer
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// The document as displayed, markers hidden
    pub fn rendered_text(&self) -> String {
        self.layer.render(&self.state.doc, 0..self.state.doc.len())
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.router.apply_settings(settings);
        self.layer.apply_settings(settings);
        self.deletion_keys = settings.deletion_keys.clone();
        self.refresh();
    }

    /// Remove every marker in the document. Returns whether anything changed.
    pub fn clean(&mut self) -> bool {
        let tr = cleanup_transaction(&self.state);
        self.dispatch(tr)
    }

    pub fn update(&mut self, msg: impl Into<Msg>) {
        match msg.into() {
            Msg::Editor(msg) => self.update_editor(msg),
            Msg::Document(msg) => self.update_document(msg),
            Msg::Key(key) => self.handle_key(key),
        }
    }

    /// Route `tr` through the marker engine and apply the result. Returns
    /// whether the document changed.
    pub fn dispatch(&mut self, tr: Transaction) -> bool {
        let tr = self.router.filter(&self.state, tr);
        self.commit(tr, true)
    }

    fn commit(&mut self, tr: Transaction, record: bool) -> bool {
        let next = self.state.apply(&tr);
        let changed = tr.doc_changed();
        if changed && record {
            let inverse = tr.changes.invert(self.state.doc.rope());
            self.history.push(HistoryEntry::new(
                tr.changes.clone(),
                inverse,
                self.state.selection.clone(),
                next.selection.clone(),
            ));
        }
        tracing::debug!(
            event = tr.user_event.as_deref(),
            changed,
            revision = next.doc.revision(),
            "commit"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let before = SelectionSnapshot::of(&self.state.selection);
            if let Some(diff) = before.diff(&SelectionSnapshot::of(&next.selection)) {
                tracing::trace!("selection {}", diff);
            }
        }
        self.state = next;
        if changed {
            self.refresh();
        }
        changed
    }

    fn refresh(&mut self) {
        let len = self.state.doc.len();
        let visible = match &self.viewport {
            Some(range) => range.start.min(len)..range.end.min(len),
            None => 0..len,
        };
        self.layer.update(&self.state.doc, &[visible]);
    }

    fn update_document(&mut self, msg: DocumentMsg) {
        match msg {
            DocumentMsg::InsertChar(c) => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf), "input.type");
            }
            DocumentMsg::InsertNewline => self.insert("\n", "input.type"),
            DocumentMsg::InsertText(text) => self.insert(&text, "input.paste"),
            DocumentMsg::DeleteBackward => {
                self.delete(visibility::Direction::Backward, Some("delete.backward"))
            }
            DocumentMsg::DeleteForward => {
                self.delete(visibility::Direction::Forward, Some("delete.forward"))
            }
            DocumentMsg::Undo => self.undo(),
            DocumentMsg::Redo => self.redo(),
            DocumentMsg::CompositionStart => self.composing = true,
            DocumentMsg::CompositionUpdate(text) => self.insert(&text, "input.type.compose"),
            DocumentMsg::CompositionEnd => self.composing = false,
        }
    }

    fn update_editor(&mut self, msg: EditorMsg) {
        let doc_len = self.state.doc.len();
        let selection = match msg {
            EditorMsg::MoveCursor(direction) => self.map_ranges(|session, range| {
                if !range.is_empty() {
                    let pos = match direction {
                        Direction::Left => range.from(),
                        Direction::Right => range.to(),
                    };
                    return SelectionRange::cursor(pos);
                }
                SelectionRange::cursor(session.step(range.head, direction))
            }),
            EditorMsg::MoveCursorWithSelection(direction) => self.map_ranges(|session, range| {
                SelectionRange::new(range.anchor, session.step(range.head, direction))
            }),
            EditorMsg::MoveCursorLineStart => self.map_ranges(|session, range| {
                SelectionRange::cursor(session.state.doc.line_at(range.head).from)
            }),
            EditorMsg::MoveCursorLineEnd => self.map_ranges(|session, range| {
                SelectionRange::cursor(session.state.doc.line_at(range.head).to())
            }),
            EditorMsg::MoveCursorDocumentStart => EditorSelection::cursor(0),
            EditorMsg::MoveCursorDocumentEnd => EditorSelection::cursor(doc_len),
            EditorMsg::SetCursorPosition(pos) => {
                let pos = self.snap(pos.min(doc_len));
                self.dispatch(
                    Transaction::select(doc_len, EditorSelection::cursor(pos))
                        .with_user_event("select.pointer"),
                );
                return;
            }
            EditorMsg::SetSelection { anchor, head } => {
                EditorSelection::single(anchor.min(doc_len), self.snap(head.min(doc_len)))
            }
            EditorMsg::AddCursor(pos) => {
                let pos = self.snap(pos.min(doc_len));
                let mut ranges = self.state.selection.ranges().to_vec();
                ranges.push(SelectionRange::cursor(pos));
                let main = ranges.len() - 1;
                EditorSelection::create(ranges, main)
            }
            EditorMsg::SelectAll => EditorSelection::single(0, doc_len),
            EditorMsg::CollapseToSingleCursor => {
                EditorSelection::cursor(self.state.selection.main().head)
            }
            EditorMsg::ScrollTo(range) => {
                self.viewport = Some(range);
                self.refresh();
                return;
            }
        };
        self.dispatch(Transaction::select(doc_len, selection).with_user_event("select"));
    }

    fn handle_key(&mut self, key: Keystroke) {
        if self.deletion_keys.contains(&key) {
            self.update_document(DocumentMsg::DeleteBackward);
            return;
        }
        let plain = key.mods.is_empty();
        match key.key {
            KeyCode::Char(c) if plain => self.update_document(DocumentMsg::InsertChar(c)),
            KeyCode::Char(c) if key.mods == Modifiers::SHIFT => {
                self.update_document(DocumentMsg::InsertChar(c.to_ascii_uppercase()))
            }
            KeyCode::Space if plain => self.update_document(DocumentMsg::InsertChar(' ')),
            KeyCode::Tab if plain => self.update_document(DocumentMsg::InsertChar('\t')),
            KeyCode::Enter if plain => self.update_document(DocumentMsg::InsertNewline),
            // not a configured deletion key: deletes without marker handling
            KeyCode::Backspace if plain => self.delete(visibility::Direction::Backward, None),
            KeyCode::Delete if plain => self.update_document(DocumentMsg::DeleteForward),
            KeyCode::Left => self.update_editor(arrow(Direction::Left, key)),
            KeyCode::Right => self.update_editor(arrow(Direction::Right, key)),
            KeyCode::Home if plain => self.update_editor(EditorMsg::MoveCursorLineStart),
            KeyCode::End if plain => self.update_editor(EditorMsg::MoveCursorLineEnd),
            _ => tracing::trace!(%key, "unbound key"),
        }
    }

    /// Replace every selection range with `text`
    fn insert(&mut self, text: &str, event: &str) {
        let doc_len = self.state.doc.len();
        let mut changes = Vec::new();
        let mut cursors = Vec::new();
        let (mut added, mut removed) = (0, 0);
        for range in self.state.selection.ranges() {
            changes.push(Change::replace(range.from(), range.to(), text));
            cursors.push(SelectionRange::cursor(
                (range.from() + added + text.len()).saturating_sub(removed),
            ));
            added += text.len();
            removed += range.to() - range.from();
        }
        let tr = Transaction::new(ChangeSet::of(doc_len, changes))
            .with_selection(EditorSelection::create(
                cursors,
                self.state.selection.main_index(),
            ))
            .with_user_event(event)
            .with_composing(self.composing);
        self.dispatch(tr);
    }

    /// Delete every selection, or one character next to each cursor, never
    /// splitting an atomic span
    fn delete(&mut self, direction: visibility::Direction, event: Option<&str>) {
        let doc = &self.state.doc;
        let main = self.state.selection.main_index();
        let ranges: Vec<(usize, Range<usize>)> = self
            .state
            .selection
            .ranges()
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let range = if !range.is_empty() {
                    range.from()..range.to()
                } else {
                    match direction {
                        visibility::Direction::Backward => {
                            prev_boundary(doc, range.head)..range.head
                        }
                        visibility::Direction::Forward => {
                            range.head..next_boundary(doc, range.head)
                        }
                    }
                };
                (index, self.layer.expand_deletion(range))
            })
            .filter(|(_, range)| !range.is_empty())
            .collect();
        if ranges.is_empty() {
            return;
        }

        let changes = ChangeSet::of(
            doc.len(),
            ranges.iter().map(|(_, range)| Change::delete(range.start, range.end)),
        );
        let cursors = ranges
            .iter()
            .map(|(_, range)| SelectionRange::cursor(changes.map_pos(range.start, Assoc::Before)))
            .collect();
        let main = ranges
            .iter()
            .position(|(index, _)| *index == main)
            .unwrap_or(0);
        let mut tr =
            Transaction::new(changes).with_selection(EditorSelection::create(cursors, main));
        if let Some(event) = event {
            tr = tr.with_user_event(event);
        }
        self.dispatch(tr);
    }

    fn undo(&mut self) {
        let Some(entry) = self.history.pop_undo() else {
            return;
        };
        let tr = Transaction::new(entry.inverse)
            .with_selection(entry.selection_before)
            .with_user_event("undo");
        let tr = self.router.filter(&self.state, tr);
        self.commit(tr, false);
    }

    fn redo(&mut self) {
        let Some(entry) = self.history.pop_redo() else {
            return;
        };
        let tr = Transaction::new(entry.changes)
            .with_selection(entry.selection_after)
            .with_user_event("redo");
        let tr = self.router.filter(&self.state, tr);
        self.commit(tr, false);
    }

    fn map_ranges(
        &self,
        f: impl Fn(&Self, &SelectionRange) -> SelectionRange,
    ) -> EditorSelection {
        let selection = &self.state.selection;
        EditorSelection::create(
            selection.ranges().iter().map(|range| f(self, range)).collect(),
            selection.main_index(),
        )
    }

    /// One character in `direction`, jumping over atomic spans
    fn step(&self, pos: usize, direction: Direction) -> usize {
        let doc = &self.state.doc;
        match direction {
            Direction::Left => self
                .layer
                .skip_atomic(prev_boundary(doc, pos), visibility::Direction::Backward),
            Direction::Right => self
                .layer
                .skip_atomic(next_boundary(doc, pos), visibility::Direction::Forward),
        }
    }

    /// Pointer positions inside an atomic span go to its nearer edge
    fn snap(&self, pos: usize) -> usize {
        let start = self.layer.skip_atomic(pos, visibility::Direction::Backward);
        let end = self.layer.skip_atomic(pos, visibility::Direction::Forward);
        if pos - start <= end - pos {
            start
        } else {
            end
        }
    }
}

fn arrow(direction: Direction, key: Keystroke) -> EditorMsg {
    if key.mods.shift() {
        EditorMsg::MoveCursorWithSelection(direction)
    } else {
        EditorMsg::MoveCursor(direction)
    }
}

fn prev_boundary(doc: &crate::text::Document, pos: usize) -> usize {
    let rope = doc.rope();
    let char_idx = rope.byte_to_char(pos.min(rope.len_bytes()));
    match char_idx.checked_sub(1) {
        Some(prev) => rope.char_to_byte(prev),
        None => 0,
    }
}

fn next_boundary(doc: &crate::text::Document, pos: usize) -> usize {
    let rope = doc.rope();
    let char_idx = rope.byte_to_char(pos.min(rope.len_bytes()));
    rope.char_to_byte((char_idx + 1).min(rope.len_chars()))
}
