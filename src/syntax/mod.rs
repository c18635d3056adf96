//! Syntax classification for inline math
//!
//! Two layers feed the marker engine:
//!
//! ```text
//! line text ──→ inline::lex_line ──→ SyntaxNode (math-begin / math-end / display)
//! document  ──→ blocks::BlockMap  ──→ BlockKind (table / code block) per line
//! ```
//!
//! Node names come from the lexer; the rest of the crate only ever looks at
//! them through [`DelimiterKind`].

pub mod blocks;
pub mod inline;
pub mod node;

pub use blocks::{BlockKind, BlockMap};
pub use node::{
    classify, delimiter_at, is_math_begin, is_math_end, Delimiter, DelimiterKind, Side,
    SyntaxNode, MATH_BEGIN, MATH_DISPLAY, MATH_END,
};
