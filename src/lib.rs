//! mathveil - hidden markers for markdown inline math
//!
//! Keeps `$...$` delimiters styled as math while the user types inside them,
//! by inserting invisible `{} ` / ` {}` markers just inside each delimiter,
//! hiding them, making them atomic, and removing them once the cursor leaves.
//!
//! The engine plugs into a host editor at one point: every proposed
//! transaction goes through [`Router::filter`] before it is applied.

pub mod cli;
pub mod commands;
pub mod compat;
pub mod config;
pub mod config_paths;
pub mod history;
pub mod keymap;
pub mod markers;
pub mod messages;
pub mod plugin;
pub mod router;
pub mod session;
pub mod syntax;
pub mod text;
pub mod tracing;
pub mod visibility;
pub mod workspace;

// Re-export commonly used types
pub use commands::Command;
pub use config::Settings;
pub use messages::Msg;
pub use router::Router;
pub use session::EditorSession;
pub use text::{EditorState, Transaction};
pub use visibility::VisibilityLayer;
pub use workspace::Workspace;
