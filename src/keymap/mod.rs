//! Keystrokes for configurable deletion keys
//!
//! ```text
//! settings.json "deletionKeys": ["Backspace", "Ctrl+H"] → Vec<Keystroke>
//! EditMsg::Key(Keystroke) → is_deletion_key → EditMsg::DeleteBackward
//! ```

mod parse;
mod types;

pub use parse::{parse_key_string, KeymapError};
pub use types::{KeyCode, Keystroke, Modifiers};
