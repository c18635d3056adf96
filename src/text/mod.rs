//! Text model: documents, change sets, selections and transactions.
//!
//! This is the contract the marker engine consumes from an editor host.
//! All offsets are byte offsets into the document.

pub mod change;
pub mod document;
pub mod selection;
pub mod transaction;

pub use change::{Assoc, Change, ChangeSet, ChangedRange};
pub use document::{Document, Line};
pub use selection::{EditorSelection, SelectionRange};
pub use transaction::{EditorState, Transaction};

use ropey::Rope;

/// Copy the bytes `from..to` out of a rope, clamped to its length.
pub(crate) fn slice_bytes(rope: &Rope, from: usize, to: usize) -> String {
    let len = rope.len_bytes();
    let to = to.min(len);
    let from = from.min(to);
    let start = rope.byte_to_char(from);
    let end = rope.byte_to_char(to);
    rope.slice(start..end).to_string()
}
