// XCompose Sequence Table
// Ternary search tree mapping key sequences to their compose results

mod builder;
mod dump;
mod iter;

use std::path::Path;
use std::str::FromStr;

use indexmap::IndexSet;

use crate::error::{ComposeError, ComposeResult};
use crate::keysym::{BuiltinKeysyms, Keysym, KeysymResolver};
use crate::parser::{IncludeResolver, NoIncludes, Parser};
use crate::rule::{Rule, Sequence};

pub use builder::{Insertion, TableBuilder};
pub use dump::{dump, dump_to_string};
pub use iter::{Entries, Entry};

/// Upper bound on the number of nodes in one table
pub const MAX_COMPOSE_NODES: usize = 1 << 23;

/// Index into the node arena. Index 0 is the root and doubles as "no link".
pub(crate) type NodeId = u32;

pub(crate) const ROOT: NodeId = 0;
pub(crate) const NULL: NodeId = 0;

/// Index into the text pool. Index 0 is the empty string.
pub(crate) type TextId = u32;

const EMPTY_TEXT: TextId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// More keysyms follow; `eq` is the first node of the next position
    Internal { eq: NodeId },
    /// The sequence ends here
    Leaf { text: TextId, keysym: Keysym },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) keysym: Keysym,
    pub(crate) lo: NodeId,
    pub(crate) hi: NodeId,
    pub(crate) kind: NodeKind,
}

impl Node {
    fn new(keysym: Keysym, kind: NodeKind) -> Self {
        Self {
            keysym,
            lo: NULL,
            hi: NULL,
            kind,
        }
    }

    /// Continuation link, `NULL` for leaves
    pub(crate) fn eq(&self) -> NodeId {
        match self.kind {
            NodeKind::Internal { eq } => eq,
            NodeKind::Leaf { .. } => NULL,
        }
    }
}

/// A compiled compose table.
///
/// Built once, then read-only. Share it between compose sessions with an
/// `Arc`.
#[derive(Debug, Clone)]
pub struct ComposeTable {
    nodes: Vec<Node>,
    texts: IndexSet<Box<str>>,
    entries: usize,
}

impl Default for ComposeTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl ComposeTable {
    /// A table with no entries
    pub fn empty() -> Self {
        let mut texts = IndexSet::new();
        texts.insert(Box::from(""));
        Self {
            nodes: vec![Node::new(Keysym::NO_SYMBOL, NodeKind::Internal { eq: NULL })],
            texts,
            entries: 0,
        }
    }

    /// Build a table from rules, in order
    pub fn from_rules<'r>(rules: impl IntoIterator<Item = &'r Rule>) -> Self {
        let mut builder = TableBuilder::new();
        for rule in rules {
            builder.insert(rule);
        }
        builder.build()
    }

    /// Parse a Compose buffer and build its table
    pub fn from_buffer(
        input: &[u8],
        source_name: &str,
        keysyms: &dyn KeysymResolver,
        includes: &dyn IncludeResolver,
    ) -> ComposeResult<Self> {
        let mut builder = TableBuilder::new();
        Parser::new(keysyms, includes).parse_with(input, source_name, &mut |rule| {
            builder.insert(&rule);
        })?;
        let table = builder.build();
        log::debug!(
            "{}: compiled {} entries into {} nodes",
            source_name,
            table.len(),
            table.node_count()
        );
        Ok(table)
    }

    /// Read and compile a Compose file using the builtin keysym table
    pub fn from_path(path: impl AsRef<Path>, includes: &dyn IncludeResolver) -> ComposeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path)?;
        Self::from_buffer(&contents, &path.to_string_lossy(), &BuiltinKeysyms, includes)
    }

    /// Number of sequences in the table
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Number of tree nodes, the root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over all entries in sequence order
    pub fn iter(&self) -> Entries<'_> {
        Entries::new(self)
    }

    /// Visit all entries in sequence order.
    ///
    /// Yields the same entries in the same order as [`ComposeTable::iter`].
    pub fn for_each<'t>(&'t self, mut f: impl FnMut(Entry<'t>)) {
        let mut sequence = Sequence::new();
        self.visit(self.first(), &mut sequence, &mut f);
    }

    fn visit<'t>(&'t self, id: NodeId, sequence: &mut Sequence, f: &mut dyn FnMut(Entry<'t>)) {
        if id == NULL {
            return;
        }
        let node = self.node(id);
        self.visit(node.lo, sequence, f);
        sequence.push(node.keysym);
        match node.kind {
            NodeKind::Leaf { text, keysym } => f(Entry::new(sequence.clone(), self.text(text), keysym)),
            NodeKind::Internal { eq } => self.visit(eq, sequence, f),
        }
        sequence.pop();
        self.visit(node.hi, sequence, f);
    }

    /// Look up the result of a complete sequence
    pub fn lookup(&self, sequence: &[Keysym]) -> Option<Entry<'_>> {
        let mut position = self.first();
        for (idx, &keysym) in sequence.iter().enumerate() {
            let node = self.node(self.find(position, keysym)?);
            match node.kind {
                NodeKind::Leaf { text, keysym } if idx + 1 == sequence.len() => {
                    return Some(Entry::new(sequence.iter().copied().collect(), self.text(text), keysym));
                }
                NodeKind::Leaf { .. } => return None,
                NodeKind::Internal { eq } => position = eq,
            }
        }
        None
    }

    /// First node of sequence position 0
    pub(crate) fn first(&self) -> NodeId {
        self.nodes[ROOT as usize].eq()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub(crate) fn text(&self, id: TextId) -> &str {
        self.texts.get_index(id as usize).map_or("", |text| &**text)
    }

    /// Search the sibling chain starting at `start` for `keysym`
    pub(crate) fn find(&self, start: NodeId, keysym: Keysym) -> Option<NodeId> {
        let mut id = start;
        while id != NULL {
            let node = self.node(id);
            id = match keysym.cmp(&node.keysym) {
                std::cmp::Ordering::Less => node.lo,
                std::cmp::Ordering::Greater => node.hi,
                std::cmp::Ordering::Equal => return Some(id),
            };
        }
        None
    }
}

impl FromStr for ComposeTable {
    type Err = ComposeError;

    /// Compile Compose text with the builtin keysyms; includes are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_buffer(s.as_bytes(), "(string)", &BuiltinKeysyms, &NoIncludes)
    }
}

impl<'t> IntoIterator for &'t ComposeTable {
    type Item = Entry<'t>;
    type IntoIter = Entries<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
