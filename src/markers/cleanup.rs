//! Unconditional marker removal.
//!
//! Used by the "clean document" commands and the CLI, and as the recovery
//! path for any marker the live policy left behind.

use super::marker_deletions;
use crate::text::{Change, ChangeSet, Document, EditorState, Transaction};

/// User event attached to cleanup transactions. The router treats it as an
/// external change and passes it through.
pub const CLEANUP_EVENT: &str = "mathveil.cleanup";

/// Deletions for every marker in the document, in one pass over its lines
pub fn plan_cleanup(doc: &Document) -> Vec<Change> {
    (0..doc.line_count())
        .flat_map(|number| {
            let line = doc.line(number);
            let nodes = doc.line_nodes(&line);
            marker_deletions(doc, &nodes).collect::<Vec<_>>()
        })
        .collect()
}

/// The cleanup pass as a transaction against `state`
pub fn cleanup_transaction(state: &EditorState) -> Transaction {
    let plan = plan_cleanup(&state.doc);
    tracing::debug!(markers = plan.len(), "cleanup");
    Transaction::new(ChangeSet::of(state.doc.len(), plan)).with_user_event(CLEANUP_EVENT)
}

/// Strip every marker from `text`, returning the cleaned text and how many
/// markers were removed
pub fn clean_text(text: &str) -> (String, usize) {
    let doc = Document::new(text);
    let plan = plan_cleanup(&doc);
    let count = plan.len();
    if count == 0 {
        return (text.to_string(), 0);
    }
    let cleaned = doc.apply(&ChangeSet::of(doc.len(), plan));
    (cleaned.text(), count)
}
