//! Block-level markdown structure via tree-sitter-md
//!
//! Only the constructs the marker engine needs to stay out of are tracked:
//! pipe tables and code blocks. Trees are cached per document revision and
//! reparsed incrementally from the previous revision's source.

use std::cell::RefCell;
use std::ops::Range;
use std::sync::Arc;

use tree_sitter::{InputEdit, Parser, Point, Tree};

/// Block constructs that can exclude a line from marker handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Table,
    CodeBlock,
}

impl BlockKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "pipe_table" => Some(BlockKind::Table),
            "fenced_code_block" | "indented_code_block" => Some(BlockKind::CodeBlock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    kind: BlockKind,
    range: Range<usize>,
}

/// Parsed block structure of one document revision
#[derive(Debug, Clone)]
pub struct BlockMap {
    tree: Option<Tree>,
    /// The source text that was parsed (needed for computing edits)
    source: Arc<str>,
    blocks: Vec<Block>,
}

thread_local! {
    static PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's markdown parser, creating it on first use
fn with_parser<R>(f: impl FnOnce(&mut Parser) -> R) -> Option<R> {
    PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let mut parser = Parser::new();
            if let Err(e) = parser.set_language(&tree_sitter_md::LANGUAGE.into()) {
                tracing::error!("Failed to set markdown language: {}", e);
                return None;
            }
            *slot = Some(parser);
        }
        slot.as_mut().map(f)
    })
}

impl BlockMap {
    /// Full parse
    pub fn parse(source: &str) -> Self {
        let tree = with_parser(|parser| parser.parse(source, None)).flatten();
        if tree.is_none() {
            tracing::warn!("Markdown parse failed; block exclusions disabled for this revision");
        }
        Self::from_tree(tree, source)
    }

    /// Parse `new_source`, reusing this revision's tree where possible
    pub fn reparse(&self, new_source: &str) -> Self {
        let Some(old_tree) = &self.tree else {
            return Self::parse(new_source);
        };
        let Some(edit) = compute_incremental_edit(&self.source, new_source) else {
            tracing::trace!("Source unchanged, reusing cached tree");
            return self.clone();
        };

        let mut edited = old_tree.clone();
        edited.edit(&edit);
        tracing::trace!(
            "Incremental parse: edit at byte {}..{} -> {}..{}",
            edit.start_byte,
            edit.old_end_byte,
            edit.start_byte,
            edit.new_end_byte
        );

        match with_parser(|parser| parser.parse(new_source, Some(&edited))).flatten() {
            Some(tree) => Self::from_tree(Some(tree), new_source),
            None => {
                tracing::warn!("Incremental parse failed, falling back to full parse");
                Self::parse(new_source)
            }
        }
    }

    fn from_tree(tree: Option<Tree>, source: &str) -> Self {
        let blocks = tree.as_ref().map(collect_blocks).unwrap_or_default();
        Self {
            tree,
            source: Arc::from(source),
            blocks,
        }
    }

    /// Byte ranges of the blocks of `kind`, in document order
    pub fn ranges(&self, kind: BlockKind) -> impl Iterator<Item = Range<usize>> + '_ {
        self.blocks
            .iter()
            .filter(move |block| block.kind == kind)
            .map(|block| block.range.clone())
    }

    /// Kind of the block overlapping the line spanning `from..=to`
    pub fn kind_in(&self, from: usize, to: usize) -> Option<BlockKind> {
        self.blocks
            .iter()
            .find(|block| block.range.start <= to && from < block.range.end)
            .map(|block| block.kind)
    }
}

/// Pre-order walk collecting the outermost tracked blocks
fn collect_blocks(tree: &Tree) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = tree.walk();
    'walk: loop {
        let node = cursor.node();
        let kind = BlockKind::from_node_kind(node.kind());
        if let Some(kind) = kind {
            blocks.push(Block {
                kind,
                range: node.start_byte()..node.end_byte(),
            });
        }
        if kind.is_none() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    blocks
}

/// Convert a byte offset to a tree-sitter Point (row, column in bytes)
fn byte_to_point(text: &str, byte_offset: usize) -> Point {
    let before = &text.as_bytes()[..byte_offset.min(text.len())];
    let row = before.iter().filter(|&&byte| byte == b'\n').count();
    let column = match before.iter().rposition(|&byte| byte == b'\n') {
        Some(newline) => before.len() - newline - 1,
        None => before.len(),
    };
    Point { row, column }
}

/// Compute an InputEdit from the common prefix and suffix of two sources.
/// Returns None if the sources are identical.
fn compute_incremental_edit(old_src: &str, new_src: &str) -> Option<InputEdit> {
    if old_src == new_src {
        return None;
    }
    let old_bytes = old_src.as_bytes();
    let new_bytes = new_src.as_bytes();

    let start = old_bytes
        .iter()
        .zip(new_bytes)
        .take_while(|(a, b)| a == b)
        .count();

    // Common suffix, not overlapping the prefix
    let mut old_end = old_bytes.len();
    let mut new_end = new_bytes.len();
    while old_end > start && new_end > start && old_bytes[old_end - 1] == new_bytes[new_end - 1] {
        old_end -= 1;
        new_end -= 1;
    }

    Some(InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position: byte_to_point(old_src, start),
        old_end_position: byte_to_point(old_src, old_end),
        new_end_position: byte_to_point(new_src, new_end),
    })
}
