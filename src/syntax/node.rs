//! Delimiter nodes and their classification.

use std::borrow::Cow;

use crate::text::Document;

/// Node name of an opening inline-math `$`
pub const MATH_BEGIN: &str = "math-begin";
/// Node name of a closing inline-math `$`
pub const MATH_END: &str = "math-end";
/// Node name of a `$$` display-math delimiter
pub const MATH_DISPLAY: &str = "math-display-delimiter";

const DELIMITER: &str = "$";

/// A named span produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub name: Cow<'static, str>,
    pub from: usize,
    pub to: usize,
}

impl SyntaxNode {
    pub fn new(name: impl Into<Cow<'static, str>>, from: usize, to: usize) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }
}

/// What a node means to the marker engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelimiterKind {
    Begin,
    End,
    Other,
}

/// Which side of a position a node lookup looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The node ending at the position
    Before,
    /// The node starting at the position
    After,
}

/// Classify a node. The name must match and the node must span exactly one `$`.
pub fn classify(node: &SyntaxNode, doc: &Document) -> DelimiterKind {
    let kind = match node.name.as_ref() {
        MATH_BEGIN => DelimiterKind::Begin,
        MATH_END => DelimiterKind::End,
        _ => return DelimiterKind::Other,
    };
    if node.to != node.from + DELIMITER.len() || doc.slice(node.from, node.to) != DELIMITER {
        return DelimiterKind::Other;
    }
    kind
}

pub fn is_math_begin(node: &SyntaxNode, doc: &Document) -> bool {
    classify(node, doc) == DelimiterKind::Begin
}

pub fn is_math_end(node: &SyntaxNode, doc: &Document) -> bool {
    classify(node, doc) == DelimiterKind::End
}

/// A classified inline-math delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub kind: DelimiterKind,
    pub from: usize,
    pub to: usize,
}

/// The Begin or End delimiter adjacent to `pos` on the given side
pub fn delimiter_at(doc: &Document, pos: usize, side: Side) -> Option<Delimiter> {
    let node = doc.node_at(pos, side)?;
    match classify(&node, doc) {
        DelimiterKind::Other => None,
        kind => Some(Delimiter {
            kind,
            from: node.from,
            to: node.to,
        }),
    }
}
