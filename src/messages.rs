//! Message types for a headless editor session
//!
//! Every change to an [`EditorSession`](crate::session::EditorSession) flows
//! through these messages.

use std::ops::Range;

use crate::keymap::Keystroke;

/// Direction for cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Cursor and selection messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMsg {
    /// Move cursor one character (arrow keys)
    MoveCursor(Direction),
    /// Move cursor to start of line (Home key)
    MoveCursorLineStart,
    /// Move cursor to end of line (End key)
    MoveCursorLineEnd,
    /// Move cursor to start of document
    MoveCursorDocumentStart,
    /// Move cursor to end of document
    MoveCursorDocumentEnd,
    /// Extend the selection one character (Shift+Arrow)
    MoveCursorWithSelection(Direction),
    /// Set cursor to a byte offset (mouse click)
    SetCursorPosition(usize),
    /// Select a range (mouse drag)
    SetSelection { anchor: usize, head: usize },
    /// Add a cursor at a byte offset (Option+Click)
    AddCursor(usize),
    /// Select the whole document
    SelectAll,
    /// Collapse to the main cursor
    CollapseToSingleCursor,
    /// Change the visible byte range
    ScrollTo(Range<usize>),
}

/// Text editing messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentMsg {
    /// Insert a character at every cursor
    InsertChar(char),
    /// Insert a newline at every cursor
    InsertNewline,
    /// Paste text at every cursor
    InsertText(String),
    /// Delete character before cursor (Backspace)
    DeleteBackward,
    /// Delete character at cursor (Delete)
    DeleteForward,
    Undo,
    Redo,
    /// Input method composition started
    CompositionStart,
    /// Composed text, inserted over the selection
    CompositionUpdate(String),
    /// Input method composition committed
    CompositionEnd,
}

/// Top-level message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Editor(EditorMsg),
    Document(DocumentMsg),
    /// A raw keystroke; configured deletion keys delete backward
    Key(Keystroke),
}

impl From<EditorMsg> for Msg {
    fn from(msg: EditorMsg) -> Self {
        Msg::Editor(msg)
    }
}

impl From<DocumentMsg> for Msg {
    fn from(msg: DocumentMsg) -> Self {
        Msg::Document(msg)
    }
}
