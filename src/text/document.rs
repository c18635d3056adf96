//! Rope-backed document revision with its parsed structure.

use ropey::Rope;

use super::change::ChangeSet;
use super::slice_bytes;
use crate::syntax::blocks::{BlockKind, BlockMap};
use crate::syntax::inline::lex_line;
use crate::syntax::node::{Side, SyntaxNode};

/// One immutable document revision.
///
/// Inline-math nodes are derived per line on every query. Block structure
/// (tables, code blocks) comes from a tree-sitter tree that is reparsed
/// incrementally when a change set is applied.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    blocks: BlockMap,
    revision: u64,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            blocks: BlockMap::parse(text),
            revision: 0,
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Text between two byte offsets, clamped to the document
    pub fn slice(&self, from: usize, to: usize) -> String {
        slice_bytes(&self.rope, from, to)
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The line containing `pos`
    pub fn line_at(&self, pos: usize) -> Line {
        self.line(self.rope.byte_to_line(pos.min(self.len())))
    }

    /// Line by zero-based number, clamped to the last line
    pub fn line(&self, number: usize) -> Line {
        let number = number.min(self.rope.len_lines().saturating_sub(1));
        let from = self.rope.line_to_byte(number);
        let mut text = self.rope.line(number).to_string();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        Line { number, from, text }
    }

    /// Nearest `needle` byte at or after `pos`, anywhere in the document
    pub fn find_from(&self, needle: u8, pos: usize) -> Option<usize> {
        if pos >= self.len() {
            return None;
        }
        self.rope
            .bytes_at(pos)
            .position(|byte| byte == needle)
            .map(|index| pos + index)
    }

    /// Nearest `needle` byte in `from..to`, scanning backward from `to`
    pub fn rfind_in(&self, needle: u8, from: usize, to: usize) -> Option<usize> {
        let to = to.min(self.len());
        let mut bytes = self.rope.bytes_at(to);
        let mut pos = to;
        while pos > from {
            pos -= 1;
            if bytes.prev()? == needle {
                return Some(pos);
            }
        }
        None
    }

    /// Block construct covering the start of line `number`, if any
    pub fn block_at_line(&self, number: usize) -> Option<BlockKind> {
        let line = self.line(number);
        self.blocks.kind_in(line.from, line.to())
    }

    /// Byte ranges of the blocks of `kind`
    pub fn block_ranges(&self, kind: BlockKind) -> Vec<std::ops::Range<usize>> {
        self.blocks.ranges(kind).collect()
    }

    /// Delimiter-level nodes of one line. Lines inside code blocks have none.
    pub fn line_nodes(&self, line: &Line) -> Vec<SyntaxNode> {
        if self.blocks.kind_in(line.from, line.to()) == Some(BlockKind::CodeBlock) {
            return Vec::new();
        }
        lex_line(&line.text, line.from)
    }

    /// The node that starts at `pos` (`Side::After`) or ends at `pos`
    /// (`Side::Before`)
    pub fn node_at(&self, pos: usize, side: Side) -> Option<SyntaxNode> {
        let line = match side {
            Side::After => self.line_at(pos),
            Side::Before => self.line_at(pos.checked_sub(1)?),
        };
        self.line_nodes(&line)
            .into_iter()
            .find(|node| match side {
                Side::After => node.from == pos,
                Side::Before => node.to == pos,
            })
    }

    /// All nodes touching the inclusive range `from..=to`
    pub fn nodes_in(&self, from: usize, to: usize) -> Vec<SyntaxNode> {
        let first = self.rope.byte_to_line(from.min(self.len()));
        let last = self.rope.byte_to_line(to.min(self.len()));
        (first..=last)
            .flat_map(|number| self.line_nodes(&self.line(number)))
            .filter(|node| node.to >= from && node.from <= to)
            .collect()
    }

    /// The next revision. An empty change set keeps the parse tree as is.
    pub fn apply(&self, changes: &ChangeSet) -> Document {
        if changes.is_empty() {
            return self.clone();
        }
        let rope = changes.apply(&self.rope);
        let blocks = self.blocks.reparse(&rope.to_string());
        Document {
            rope,
            blocks,
            revision: self.revision + 1,
        }
    }
}

/// One line of a document, without its line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Zero-based line number
    pub number: usize,
    /// Byte offset of the line start
    pub from: usize,
    pub text: String,
}

impl Line {
    /// Byte offset of the line end (before the line break)
    pub fn to(&self) -> usize {
        self.from + self.text.len()
    }

    /// Nearest `needle` strictly before the absolute offset `pos`
    pub fn rfind_before(&self, needle: char, pos: usize) -> Option<usize> {
        let end = pos.checked_sub(self.from)?.min(self.text.len());
        self.text
            .get(..end)?
            .rfind(needle)
            .map(|index| self.from + index)
    }

    /// Nearest `needle` at or after the absolute offset `pos`
    pub fn find_from(&self, needle: char, pos: usize) -> Option<usize> {
        let start = pos.saturating_sub(self.from);
        self.text
            .get(start..)?
            .find(needle)
            .map(|index| self.from + start + index)
    }

    /// Nearest occurrence of `pattern` starting strictly before `pos`
    pub fn rfind_str_before(&self, pattern: &str, pos: usize) -> Option<usize> {
        let end = pos.checked_sub(self.from)?.min(self.text.len());
        self.text
            .match_indices(pattern)
            .map(|(index, _)| index)
            .filter(|index| *index < end)
            .last()
            .map(|index| self.from + index)
    }

    /// Nearest occurrence of `pattern` starting at or after `pos`
    pub fn find_str_from(&self, pattern: &str, pos: usize) -> Option<usize> {
        let start = pos.saturating_sub(self.from);
        self.text
            .match_indices(pattern)
            .map(|(index, _)| index)
            .find(|index| *index >= start)
            .map(|index| self.from + index)
    }
}
