//! Transactions and the editor state they apply to.

use super::change::ChangeSet;
use super::document::Document;
use super::selection::EditorSelection;

/// One proposed document-and-selection change.
///
/// `changes` are expressed against the start document; `selection`, when
/// present, is expressed against the document the changes produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub changes: ChangeSet,
    pub selection: Option<EditorSelection>,
    /// Why the host produced this transaction, e.g. `input.type`,
    /// `delete.backward`, `select.pointer`. `None` for programmatic changes.
    pub user_event: Option<String>,
    /// Set while an input method composition is in progress
    pub composing: bool,
}

impl Transaction {
    pub fn new(changes: ChangeSet) -> Self {
        Self {
            changes,
            selection: None,
            user_event: None,
            composing: false,
        }
    }

    /// A transaction that only moves the selection in a document of `doc_len` bytes
    pub fn select(doc_len: usize, selection: EditorSelection) -> Self {
        Self::new(ChangeSet::empty(doc_len)).with_selection(selection)
    }

    pub fn with_selection(mut self, selection: EditorSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_user_event(mut self, event: impl Into<String>) -> Self {
        self.user_event = Some(event.into());
        self
    }

    pub fn with_composing(mut self, composing: bool) -> Self {
        self.composing = composing;
        self
    }

    pub fn doc_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// First segment of the user event tag (`input.type` → `input`)
    pub fn user_event_root(&self) -> Option<&str> {
        self.user_event
            .as_deref()
            .and_then(|event| event.split('.').next())
    }

    /// Merge supplemental edits, expressed against the same start document,
    /// into this transaction so both land as one change.
    ///
    /// The supplemental edits are rebased over this transaction's own changes
    /// (its insertions win ties) and the new selection is mapped over them.
    pub fn augment(self, supplemental: ChangeSet) -> Self {
        if supplemental.is_empty() {
            return self;
        }
        let rebased = supplemental.map(&self.changes);
        Self {
            changes: self.changes.compose(&rebased),
            selection: self.selection.map(|selection| selection.map(&rebased)),
            user_event: self.user_event,
            composing: self.composing,
        }
    }

    /// Follow this transaction with `next`, expressed against the document
    /// this transaction produces. The selection is mapped over `next`.
    pub fn then(self, next: ChangeSet) -> Self {
        if next.is_empty() {
            return self;
        }
        Self {
            changes: self.changes.compose(&next),
            selection: self.selection.map(|selection| selection.map(&next)),
            user_event: self.user_event,
            composing: self.composing,
        }
    }
}

/// An immutable document revision plus its selection.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub doc: Document,
    pub selection: EditorSelection,
}

impl EditorState {
    pub fn new(text: &str) -> Self {
        Self {
            doc: Document::new(text),
            selection: EditorSelection::cursor(0),
        }
    }

    pub fn with_selection(mut self, selection: EditorSelection) -> Self {
        self.selection = selection.clamp(self.doc.len());
        self
    }

    /// The state produced by a transaction. Without an explicit selection the
    /// current one is mapped through the changes.
    pub fn apply(&self, tr: &Transaction) -> EditorState {
        let doc = self.doc.apply(&tr.changes);
        let selection = match &tr.selection {
            Some(selection) => selection.clamp(doc.len()),
            None => self.selection.map(&tr.changes).clamp(doc.len()),
        };
        EditorState { doc, selection }
    }
}
