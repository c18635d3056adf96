//! Line-local lexer for `$` delimiters.
//!
//! Rules, left to right:
//! - a backslash escapes the next character
//! - backtick code spans are skipped (a run of N backticks closes on the next
//!   run of exactly N)
//! - `$$` followed by non-empty content and another `$$` is display math
//! - otherwise `$` opens inline math, closed by the next unescaped `$`
//!
//! An opening `$` with no closing partner produces no node.

use super::node::{SyntaxNode, MATH_BEGIN, MATH_DISPLAY, MATH_END};

/// Lex one line. `offset` is the byte offset of the line in its document.
pub fn lex_line(text: &str, offset: usize) -> Vec<SyntaxNode> {
    let bytes = text.as_bytes();
    let mut nodes = Vec::new();
    let mut open: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' if open.is_none() => i = skip_code_span(bytes, i),
            b'$' => match open.take() {
                Some(begin) => {
                    nodes.push(SyntaxNode::new(MATH_BEGIN, offset + begin, offset + begin + 1));
                    nodes.push(SyntaxNode::new(MATH_END, offset + i, offset + i + 1));
                    i += 1;
                }
                None => {
                    if let Some(close) = display_close(text, i) {
                        nodes.push(SyntaxNode::new(MATH_DISPLAY, offset + i, offset + i + 2));
                        nodes.push(SyntaxNode::new(MATH_DISPLAY, offset + close, offset + close + 2));
                        i = close + 2;
                    } else {
                        open = Some(i);
                        i += 1;
                    }
                }
            },
            _ => i += 1,
        }
    }
    nodes
}

/// Position of the `$$` closing a display span opened at `at`, if the span
/// has content.
fn display_close(text: &str, at: usize) -> Option<usize> {
    if !text[at..].starts_with("$$") {
        return None;
    }
    let search = at + 2;
    text[search..]
        .match_indices("$$")
        .map(|(index, _)| index)
        .find(|index| *index > 0)
        .map(|index| search + index)
}

/// Index just past the code span starting at `at`, or past the backtick run
/// when the span never closes.
fn skip_code_span(bytes: &[u8], at: usize) -> usize {
    let run = count_run(bytes, at);
    let mut i = at + run;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let closing = count_run(bytes, i);
            if closing == run {
                return i + closing;
            }
            i += closing;
        } else {
            i += 1;
        }
    }
    at + run
}

fn count_run(bytes: &[u8], at: usize) -> usize {
    bytes[at..].iter().take_while(|&&byte| byte == b'`').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str) -> Vec<(&'static str, usize)> {
        lex_line(text, 0)
            .into_iter()
            .map(|node| {
                let name = match node.name.as_ref() {
                    MATH_BEGIN => "begin",
                    MATH_END => "end",
                    _ => "display",
                };
                (name, node.from)
            })
            .collect()
    }

    #[test]
    fn test_simple_pair() {
        assert_eq!(spans("a $x$ b"), vec![("begin", 2), ("end", 4)]);
    }

    #[test]
    fn test_empty_pair() {
        assert_eq!(spans("$$"), vec![("begin", 0), ("end", 1)]);
    }

    #[test]
    fn test_pair_with_markers() {
        assert_eq!(spans("${} x {}$"), vec![("begin", 0), ("end", 8)]);
    }

    #[test]
    fn test_unmatched_dollar_has_no_node() {
        assert!(spans("costs $5").is_empty());
        assert_eq!(spans("$a$ and $"), vec![("begin", 0), ("end", 2)]);
    }

    #[test]
    fn test_escaped_dollar() {
        assert!(spans(r"\$a\$").is_empty());
        assert_eq!(spans(r"$a\$b$"), vec![("begin", 0), ("end", 5)]);
    }

    #[test]
    fn test_code_span_is_skipped() {
        assert_eq!(spans("`$a$` $b$"), vec![("begin", 6), ("end", 8)]);
        assert_eq!(spans("``a`$`` $b$"), vec![("begin", 8), ("end", 10)]);
        // unclosed code span only skips its backticks
        assert_eq!(spans("` $b$"), vec![("begin", 2), ("end", 4)]);
    }

    #[test]
    fn test_display_math() {
        assert_eq!(spans("$$x$$"), vec![("display", 0), ("display", 3)]);
        assert_eq!(spans("$$$$"), vec![("begin", 0), ("end", 1), ("begin", 2), ("end", 3)]);
    }

    #[test]
    fn test_offset_is_applied() {
        let nodes = lex_line("$x$", 10);
        assert_eq!((nodes[0].from, nodes[1].to), (10, 13));
    }

    #[test]
    fn test_multibyte_content() {
        assert_eq!(spans("é $α$"), vec![("begin", 3), ("end", 6)]);
    }
}
