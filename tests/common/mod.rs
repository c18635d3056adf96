//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use mathveil::config::Settings;
use mathveil::messages::{Direction, DocumentMsg, EditorMsg};
use mathveil::syntax::{classify, DelimiterKind};
use mathveil::text::Document;
use mathveil::EditorSession;

/// Create a session with default settings and a cursor at `cursor`
pub fn test_session(text: &str, cursor: usize) -> EditorSession {
    EditorSession::new(text, &Settings::default()).with_cursor(cursor)
}

/// Create a session with custom settings
pub fn test_session_with(text: &str, cursor: usize, settings: &Settings) -> EditorSession {
    EditorSession::new(text, settings).with_cursor(cursor)
}

/// Type `text` one character at a time
pub fn type_text(session: &mut EditorSession, text: &str) {
    for c in text.chars() {
        session.update(DocumentMsg::InsertChar(c));
    }
}

pub fn backspace(session: &mut EditorSession) {
    session.update(DocumentMsg::DeleteBackward);
}

pub fn left(session: &mut EditorSession) {
    session.update(EditorMsg::MoveCursor(Direction::Left));
}

pub fn right(session: &mut EditorSession) {
    session.update(EditorMsg::MoveCursor(Direction::Right));
}

/// Every opening delimiter is followed by either exactly the begin marker or
/// by text that does not start with `{`; mirrored for closing delimiters
pub fn markers_well_formed(text: &str) -> bool {
    let doc = Document::new(text);
    (0..doc.line_count()).all(|number| {
        let line = doc.line(number);
        doc.line_nodes(&line)
            .iter()
            .all(|node| match classify(node, &doc) {
                DelimiterKind::Begin => {
                    let after = doc.slice(node.to, node.to + 3);
                    after == "{} " || !after.starts_with('{')
                }
                DelimiterKind::End => {
                    let before = doc.slice(node.from.saturating_sub(3), node.from);
                    before == " {}" || !before.ends_with('}')
                }
                DelimiterKind::Other => true,
            })
    })
}
