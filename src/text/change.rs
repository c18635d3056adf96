//! Change sets: the document half of a transaction.
//!
//! A [`ChangeSet`] is a sequence of retain/delete/insert operations that
//! covers the whole input document. Offsets are byte offsets. Change sets can
//! be composed (apply one after another), mapped over a concurrent change set
//! (rebase), inverted for undo, and used to map positions.

use ropey::Rope;

use super::slice_bytes;

/// A single replacement, expressed against the document it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    /// Insert `text` at `at`
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            insert: text.into(),
        }
    }

    /// Delete the range `from..to`
    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            insert: String::new(),
        }
    }

    /// Replace the range `from..to` with `text`
    pub fn replace(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: text.into(),
        }
    }

    /// A change that neither removes nor adds text
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.insert.is_empty()
    }
}

/// One contiguous changed region, reported in both coordinate spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRange {
    /// Start in the input document
    pub from_a: usize,
    /// End in the input document
    pub to_a: usize,
    /// Start in the output document
    pub from_b: usize,
    /// End in the output document
    pub to_b: usize,
    /// Text that replaced `from_a..to_a`
    pub inserted: String,
}

/// Which side of an insertion a mapped position sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Retain(usize),
    Delete(usize),
    Insert(String),
}

impl Op {
    fn len(&self) -> usize {
        match self {
            Op::Retain(n) | Op::Delete(n) => *n,
            Op::Insert(text) => text.len(),
        }
    }

    /// What is left of this operation after consuming `taken` bytes of it.
    fn skip(self, taken: usize) -> Option<Op> {
        match self {
            Op::Retain(n) => (n > taken).then(|| Op::Retain(n - taken)),
            Op::Delete(n) => (n > taken).then(|| Op::Delete(n - taken)),
            Op::Insert(text) => {
                let (_, rest) = split_at_boundary(&text, taken);
                (!rest.is_empty()).then(|| Op::Insert(rest.to_owned()))
            }
        }
    }
}

fn split_at_boundary(text: &str, at: usize) -> (&str, &str) {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    text.split_at(at)
}

/// An edit covering a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeSet {
    ops: Vec<Op>,
}

impl ChangeSet {
    /// A change set that leaves a document of `len` bytes untouched
    pub fn empty(len: usize) -> Self {
        let mut set = Self::default();
        set.retain(len);
        set
    }

    /// Build a change set from replacements expressed against a document of
    /// `doc_len` bytes.
    ///
    /// Changes are sorted by start (keeping the given order for equal starts),
    /// clamped to the document, deduplicated, and overlapping ranges are merged
    /// into one replacement whose inserted text is the concatenation of theirs.
    pub fn of(doc_len: usize, changes: impl IntoIterator<Item = Change>) -> Self {
        let mut list: Vec<Change> = Vec::new();
        for change in changes {
            let to = change.to.min(doc_len);
            let from = change.from.min(to);
            let change = Change::replace(from, to, change.insert);
            if !change.is_noop() && !list.contains(&change) {
                list.push(change);
            }
        }
        list.sort_by_key(|change| change.from);

        let mut merged: Vec<Change> = Vec::with_capacity(list.len());
        for change in list {
            match merged.last_mut() {
                Some(last) if change.from < last.to => {
                    last.to = last.to.max(change.to);
                    last.insert.push_str(&change.insert);
                }
                _ => merged.push(change),
            }
        }

        let mut set = Self::default();
        let mut pos = 0;
        for change in merged {
            set.retain(change.from - pos);
            set.push_insert(&change.insert);
            set.delete(change.to - change.from);
            pos = change.to;
        }
        set.retain(doc_len - pos);
        set
    }

    fn retain(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if let Some(Op::Retain(last)) = self.ops.last_mut() {
            *last += n;
        } else {
            self.ops.push(Op::Retain(n));
        }
    }

    fn delete(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if let Some(Op::Delete(last)) = self.ops.last_mut() {
            *last += n;
        } else {
            self.ops.push(Op::Delete(n));
        }
    }

    fn push_insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Op::Insert(last)) = self.ops.last_mut() {
            last.push_str(text);
        } else {
            self.ops.push(Op::Insert(text.to_owned()));
        }
    }

    /// Length of the document this change set applies to
    pub fn len_before(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Retain(n) | Op::Delete(n) => *n,
                Op::Insert(_) => 0,
            })
            .sum()
    }

    /// Length of the document this change set produces
    pub fn len_after(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Retain(n) => *n,
                Op::Insert(text) => text.len(),
                Op::Delete(_) => 0,
            })
            .sum()
    }

    /// True when applying this change set leaves the document unchanged
    pub fn is_empty(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, Op::Retain(_)))
    }

    /// Contiguous changed regions, in document order
    pub fn iter_changes(&self) -> Vec<ChangedRange> {
        let mut out = Vec::new();
        let (mut a, mut b) = (0usize, 0usize);
        let mut pending: Option<ChangedRange> = None;

        for op in &self.ops {
            match op {
                Op::Retain(n) => {
                    if let Some(range) = pending.take() {
                        out.push(range);
                    }
                    a += n;
                    b += n;
                }
                Op::Insert(text) => {
                    let range = pending.get_or_insert_with(|| ChangedRange {
                        from_a: a,
                        to_a: a,
                        from_b: b,
                        to_b: b,
                        inserted: String::new(),
                    });
                    range.inserted.push_str(text);
                    b += text.len();
                    range.to_b = b;
                }
                Op::Delete(n) => {
                    let range = pending.get_or_insert_with(|| ChangedRange {
                        from_a: a,
                        to_a: a,
                        from_b: b,
                        to_b: b,
                        inserted: String::new(),
                    });
                    a += n;
                    range.to_a = a;
                }
            }
        }
        if let Some(range) = pending {
            out.push(range);
        }
        out
    }

    /// Whether one of the changed regions starts at `pos` (input coordinates)
    pub fn starts_change_at(&self, pos: usize) -> bool {
        self.iter_changes().iter().any(|range| range.from_a == pos)
    }

    /// Apply to a rope, producing the output document
    pub fn apply(&self, doc: &Rope) -> Rope {
        let mut rope = doc.clone();
        for range in self.iter_changes().iter().rev() {
            let len = rope.len_bytes();
            let from = rope.byte_to_char(range.from_a.min(len));
            let to = rope.byte_to_char(range.to_a.min(len));
            if to > from {
                rope.remove(from..to);
            }
            if !range.inserted.is_empty() {
                rope.insert(from, &range.inserted);
            }
        }
        rope
    }

    /// The change set that undoes this one. `doc` is the input document.
    pub fn invert(&self, doc: &Rope) -> ChangeSet {
        let mut out = ChangeSet::default();
        let mut a = 0;
        for op in &self.ops {
            match op {
                Op::Retain(n) => {
                    out.retain(*n);
                    a += n;
                }
                Op::Insert(text) => out.delete(text.len()),
                Op::Delete(n) => {
                    out.push_insert(&slice_bytes(doc, a, a + n));
                    a += n;
                }
            }
        }
        out
    }

    /// Apply `other` after `self`, as one change set over `self`'s input.
    pub fn compose(&self, other: &ChangeSet) -> ChangeSet {
        let mut out = ChangeSet::default();
        let mut first_ops = self.ops.iter().cloned();
        let mut second_ops = other.ops.iter().cloned();
        let mut first = first_ops.next();
        let mut second = second_ops.next();

        loop {
            match (first.take(), second.take()) {
                (None, None) => break,
                (Some(Op::Delete(n)), next) => {
                    out.delete(n);
                    first = first_ops.next();
                    second = next;
                }
                (next, Some(Op::Insert(text))) => {
                    out.push_insert(&text);
                    first = next;
                    second = second_ops.next();
                }
                (None, Some(_)) | (Some(_), None) => {
                    tracing::warn!(
                        before = self.len_after(),
                        after = other.len_before(),
                        "compose: change set lengths do not line up"
                    );
                    break;
                }
                (Some(op_a), Some(op_b)) => {
                    let taken = op_a.len().min(op_b.len());
                    match (&op_a, &op_b) {
                        (Op::Retain(_), Op::Retain(_)) => out.retain(taken),
                        (Op::Insert(text), Op::Retain(_)) => {
                            out.push_insert(split_at_boundary(text, taken).0)
                        }
                        (Op::Retain(_), Op::Delete(_)) => out.delete(taken),
                        // inserted by the first set, deleted by the second
                        _ => {}
                    }
                    first = op_a.skip(taken).or_else(|| first_ops.next());
                    second = op_b.skip(taken).or_else(|| second_ops.next());
                }
            }
        }
        out
    }

    /// Rebase `self` so it applies after `over`.
    ///
    /// Both sets must share the same input document. Where both insert at the
    /// same position, `over`'s text comes first. Text that `over` deleted is
    /// no longer touched by the result.
    pub fn map(&self, over: &ChangeSet) -> ChangeSet {
        let mut out = ChangeSet::default();
        let mut over_ops = over.ops.iter().cloned();
        let mut own_ops = self.ops.iter().cloned();
        let mut theirs = over_ops.next();
        let mut ours = own_ops.next();

        loop {
            match (theirs.take(), ours.take()) {
                (None, None) => break,
                (Some(Op::Insert(text)), next) => {
                    out.retain(text.len());
                    theirs = over_ops.next();
                    ours = next;
                }
                (next, Some(Op::Insert(text))) => {
                    out.push_insert(&text);
                    theirs = next;
                    ours = own_ops.next();
                }
                (None, Some(_)) | (Some(_), None) => {
                    tracing::warn!(
                        over = over.len_before(),
                        own = self.len_before(),
                        "map: change sets cover different documents"
                    );
                    break;
                }
                (Some(op_over), Some(op_own)) => {
                    let taken = op_over.len().min(op_own.len());
                    match (&op_over, &op_own) {
                        (Op::Retain(_), Op::Retain(_)) => out.retain(taken),
                        (Op::Retain(_), Op::Delete(_)) => out.delete(taken),
                        // already deleted by `over`
                        _ => {}
                    }
                    theirs = op_over.skip(taken).or_else(|| over_ops.next());
                    ours = op_own.skip(taken).or_else(|| own_ops.next());
                }
            }
        }
        out
    }

    /// Map a position in the input document to the output document.
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> usize {
        let (mut a, mut b) = (0usize, 0usize);
        for op in &self.ops {
            match op {
                Op::Retain(n) => {
                    if pos < a + n {
                        return b + (pos - a);
                    }
                    a += n;
                    b += n;
                }
                Op::Delete(n) => {
                    if pos < a + n {
                        return b;
                    }
                    a += n;
                }
                Op::Insert(text) => {
                    if pos == a && assoc == Assoc::Before {
                        return b;
                    }
                    b += text.len();
                }
            }
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str, set: &ChangeSet) -> String {
        set.apply(&Rope::from_str(text)).to_string()
    }

    #[test]
    fn test_of_sorts_and_applies() {
        let set = ChangeSet::of(
            5,
            [Change::insert(5, "!"), Change::replace(0, 1, "J")],
        );
        assert_eq!(apply("hello", &set), "Jello!");
        assert_eq!(set.len_before(), 5);
        assert_eq!(set.len_after(), 6);
    }

    #[test]
    fn test_of_merges_overlapping_deletions() {
        let set = ChangeSet::of(9, [Change::delete(1, 4), Change::delete(3, 6)]);
        assert_eq!(apply("${}  {}$x", &set), "$}$x");
        assert_eq!(set.iter_changes().len(), 1);
    }

    #[test]
    fn test_of_drops_duplicates_and_noops() {
        let set = ChangeSet::of(
            3,
            [
                Change::delete(0, 1),
                Change::delete(0, 1),
                Change::insert(2, ""),
            ],
        );
        assert_eq!(apply("abc", &set), "bc");
    }

    #[test]
    fn test_insertion_at_end_of_replacement_keeps_its_anchor() {
        let user = ChangeSet::of(2, [Change::insert(1, "x")]);
        let extra = ChangeSet::of(2, [Change::replace(0, 1, "${} "), Change::insert(1, " {}")]);
        let merged = user.compose(&extra.map(&user));
        assert_eq!(apply("$$", &merged), "${} x {}$");
    }

    #[test]
    fn test_map_puts_over_insertions_first() {
        let over = ChangeSet::of(3, [Change::insert(1, "a")]);
        let own = ChangeSet::of(3, [Change::insert(1, "b")]);
        let after = apply("xyz", &over);
        assert_eq!(apply(&after, &own.map(&over)), "xabyz");
    }

    #[test]
    fn test_map_skips_text_deleted_by_over() {
        let over = ChangeSet::of(9, [Change::delete(0, 4)]);
        let own = ChangeSet::of(9, [Change::delete(1, 4), Change::delete(5, 8)]);
        let after = apply("${} x {}$", &over);
        assert_eq!(apply(&after, &own.map(&over)), "x$");
    }

    #[test]
    fn test_compose_insert_then_delete_cancels() {
        let first = ChangeSet::of(3, [Change::insert(1, "XY")]);
        let second = ChangeSet::of(5, [Change::delete(1, 2)]);
        let composed = first.compose(&second);
        assert_eq!(apply("abc", &composed), "aYbc");
        assert_eq!(composed.len_before(), 3);
    }

    #[test]
    fn test_invert_round_trip() {
        let doc = Rope::from_str("${} x {}$");
        let set = ChangeSet::of(9, [Change::delete(1, 4), Change::delete(5, 8)]);
        let cleaned = set.apply(&doc);
        assert_eq!(cleaned.to_string(), "$x$");
        let undo = set.invert(&doc);
        assert_eq!(undo.apply(&cleaned).to_string(), "${} x {}$");
    }

    #[test]
    fn test_map_pos_assoc() {
        let set = ChangeSet::of(3, [Change::insert(1, "ab")]);
        assert_eq!(set.map_pos(1, Assoc::Before), 1);
        assert_eq!(set.map_pos(1, Assoc::After), 3);
        assert_eq!(set.map_pos(2, Assoc::Before), 4);
        assert_eq!(set.map_pos(10, Assoc::Before), 5);
    }

    #[test]
    fn test_map_pos_inside_deletion_collapses() {
        let set = ChangeSet::of(6, [Change::delete(1, 4)]);
        assert_eq!(set.map_pos(2, Assoc::Before), 1);
        assert_eq!(set.map_pos(4, Assoc::Before), 1);
        assert_eq!(set.map_pos(5, Assoc::Before), 2);
    }

    #[test]
    fn test_iter_changes_reports_both_sides() {
        let set = ChangeSet::of(5, [Change::replace(1, 3, "xyz")]);
        let changes = set.iter_changes();
        assert_eq!(
            changes,
            vec![ChangedRange {
                from_a: 1,
                to_a: 3,
                from_b: 1,
                to_b: 4,
                inserted: "xyz".to_string(),
            }]
        );
        assert!(set.starts_change_at(1));
        assert!(!set.starts_change_at(3));
    }

    #[test]
    fn test_empty_set() {
        let set = ChangeSet::empty(4);
        assert!(set.is_empty());
        assert_eq!(apply("abcd", &set), "abcd");
        assert!(ChangeSet::of(4, Vec::<Change>::new()).is_empty());
    }
}
