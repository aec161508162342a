// XCompose Table Iterator
// Resumable in-order traversal of the sequence table

use std::iter::FusedIterator;

use crate::keysym::Keysym;
use crate::rule::Sequence;

use super::{ComposeTable, NodeId, NodeKind, NULL};

/// One compose sequence and its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'t> {
    pub sequence: Sequence,
    pub text: &'t str,
    pub keysym: Option<Keysym>,
}

impl<'t> Entry<'t> {
    pub(crate) fn new(sequence: Sequence, text: &'t str, keysym: Keysym) -> Self {
        Self {
            sequence,
            text,
            keysym: (!keysym.is_none()).then_some(keysym),
        }
    }
}

/// Next part of a node to visit
#[derive(Debug, Clone, Copy)]
enum Step {
    Lo,
    Eq,
    Hi,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    /// Sequence position of `node`
    pos: usize,
    step: Step,
}

/// Iterator over the entries of a [`ComposeTable`], in sequence order.
///
/// Created by [`ComposeTable::iter`].
#[derive(Debug, Clone)]
pub struct Entries<'t> {
    table: &'t ComposeTable,
    stack: Vec<Frame>,
    sequence: Sequence,
}

impl<'t> Entries<'t> {
    pub(crate) fn new(table: &'t ComposeTable) -> Self {
        let mut stack = Vec::new();
        let first = table.first();
        if first != NULL {
            stack.push(Frame {
                node: first,
                pos: 0,
                step: Step::Lo,
            });
        }
        Self {
            table,
            stack,
            sequence: Sequence::new(),
        }
    }

    fn push(&mut self, node: NodeId, pos: usize) {
        if node != NULL {
            self.stack.push(Frame {
                node,
                pos,
                step: Step::Lo,
            });
        }
    }
}

impl<'t> Iterator for Entries<'t> {
    type Item = Entry<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        while let Some(frame) = self.stack.last_mut() {
            let Frame { node: id, pos, step } = *frame;
            let node = table.node(id);
            match step {
                Step::Lo => {
                    frame.step = Step::Eq;
                    self.push(node.lo, pos);
                }
                Step::Eq => {
                    frame.step = Step::Hi;
                    self.sequence.truncate(pos);
                    self.sequence.push(node.keysym);
                    match node.kind {
                        NodeKind::Leaf { text, keysym } => {
                            return Some(Entry::new(
                                self.sequence.clone(),
                                table.text(text),
                                keysym,
                            ));
                        }
                        NodeKind::Internal { eq } => self.push(eq, pos + 1),
                    }
                }
                Step::Hi => {
                    // Nothing left to do at this node; its high sibling takes
                    // its place on the stack.
                    self.stack.pop();
                    self.push(node.hi, pos);
                }
            }
        }
        None
    }
}

impl FusedIterator for Entries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::keysym_from_name;

    #[test]
    fn test_iterates_in_order() {
        let table: ComposeTable = "<c> : \"c\"\n<a> <b> : \"ab\"\n<a> <a> : \"aa\"\n<b> : \"b\"\n"
            .parse()
            .unwrap();
        let texts: Vec<_> = table.iter().map(|e| e.text).collect();
        assert_eq!(texts, ["aa", "ab", "b", "c"]);
    }

    #[test]
    fn test_entry_sequences() {
        let table: ComposeTable = "<a> <b> <c> : X\n<a> <d> : Y\n".parse().unwrap();
        let sequences: Vec<Vec<Keysym>> = table.iter().map(|e| e.sequence.to_vec()).collect();
        let a = keysym_from_name("a").unwrap();
        let b = keysym_from_name("b").unwrap();
        let c = keysym_from_name("c").unwrap();
        let d = keysym_from_name("d").unwrap();
        assert_eq!(sequences, vec![vec![a, b, c], vec![a, d]]);
    }

    #[test]
    fn test_past_the_end() {
        let table: ComposeTable = "<a> : X\n".parse().unwrap();
        let mut iter = table.iter();
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_restartable() {
        let table: ComposeTable = "<a> : X\n<b> : Y\n".parse().unwrap();
        let mut iter = table.iter();
        let first = iter.next();
        let resumed = iter.clone();
        assert_eq!(iter.count(), 1);
        assert_eq!(resumed.count(), 1);
        assert_eq!(table.iter().next(), first);
    }

    #[test]
    fn test_empty_table() {
        let table = ComposeTable::empty();
        let mut iter = table.iter();
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_keysym_none_is_reported_as_none() {
        let table: ComposeTable = "<a> : \"x\"\n".parse().unwrap();
        assert_eq!(table.iter().next().map(|e| e.keysym), Some(None));
    }
}
