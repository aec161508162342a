// XCompose Table Builder
// Rule insertion and conflict resolution for the sequence table

use std::borrow::Cow;

use crate::keysym::Keysym;
use crate::rule::{Output, Rule, MAX_SEQUENCE_LEN};

use super::{ComposeTable, Node, NodeId, NodeKind, TextId, EMPTY_TEXT, MAX_COMPOSE_NODES, NULL, ROOT};

/// What inserting one rule did to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Insertion {
    /// A new sequence was added
    Added,
    /// An identical sequence existed; its result was overwritten
    Replaced,
    /// An identical sequence with the same result existed; nothing changed
    Duplicate,
    /// A shorter existing sequence was a prefix of the rule and was dropped
    /// in favour of it
    ExtendedPrefix,
    /// The rule is a prefix of an existing longer sequence and was dropped
    DiscardedPrefix,
    /// The rule could not be inserted at all
    Ignored,
}

/// Which link of a node the insertion walk is about to follow
#[derive(Debug, Clone, Copy)]
enum Link {
    Lo(NodeId),
    Hi(NodeId),
    Eq(NodeId),
}

/// Outcome of reaching an existing node carrying the rule's keysym,
/// keyed on the node kind and whether the rule ends at this position.
enum Decision {
    /// Internal node, rule continues: go to the next position
    Descend,
    /// Internal node, rule ends: keep the longer sequences
    DiscardPrefix,
    /// Leaf node, rule ends, same result
    Duplicate,
    /// Leaf node, rule ends, different result
    Replace,
    /// Leaf node, rule continues: the leaf becomes internal
    Extend,
}

fn decide(kind: NodeKind, rule_ends: bool, text: TextId, keysym: Keysym) -> Decision {
    match (kind, rule_ends) {
        (NodeKind::Internal { .. }, false) => Decision::Descend,
        (NodeKind::Internal { .. }, true) => Decision::DiscardPrefix,
        (NodeKind::Leaf { text: old_text, keysym: old_keysym }, true) => {
            if old_text == text && old_keysym == keysym {
                Decision::Duplicate
            } else {
                Decision::Replace
            }
        }
        (NodeKind::Leaf { .. }, false) => Decision::Extend,
    }
}

/// Room left in the node arena for one more sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeBudget {
    Fits,
    /// Fits, but one more maximal sequence might not
    NearLimit,
    Exhausted,
}

fn node_budget(nodes: usize, sequence_len: usize) -> NodeBudget {
    if nodes + sequence_len >= MAX_COMPOSE_NODES {
        NodeBudget::Exhausted
    } else if nodes + sequence_len + MAX_SEQUENCE_LEN > MAX_COMPOSE_NODES {
        NodeBudget::NearLimit
    } else {
        NodeBudget::Fits
    }
}

/// Incremental builder for a [`ComposeTable`].
///
/// Rules are inserted in file order. Conflicts between a new rule and the
/// sequences already present are resolved as follows:
///
/// - an identical sequence is overwritten by the later rule
/// - an existing shorter sequence that is a prefix of the new one is
///   dropped and the new sequence takes its place
/// - a new sequence that is a prefix of existing longer ones is dropped
///
/// Siblings of the node where a conflict happens are never affected.
#[derive(Debug, Default)]
pub struct TableBuilder {
    table: ComposeTable,
    node_limit_reported: bool,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sequences inserted so far
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn build(self) -> ComposeTable {
        self.table
    }

    /// Insert one rule and report what happened to the table
    pub fn insert(&mut self, rule: &Rule) -> Insertion {
        let sequence = rule.sequence.as_slice();
        if sequence.is_empty() || sequence.len() > MAX_SEQUENCE_LEN {
            log::warn!("{}: sequence of {} keysyms ignored", describe(rule), sequence.len());
            return Insertion::Ignored;
        }
        if sequence.contains(&Keysym::NO_SYMBOL) {
            log::warn!("{}: NoSymbol cannot be part of a sequence, rule ignored", describe(rule));
            return Insertion::Ignored;
        }

        let text = if rule.output.text.contains('\0') {
            log::warn!("{}: NUL bytes dropped from the result string", describe(rule));
            Cow::Owned(rule.output.text.replace('\0', ""))
        } else {
            Cow::Borrowed(rule.output.text.as_str())
        };
        if text.is_empty() && rule.output.keysym.map_or(true, Keysym::is_none) {
            log::warn!("{}: rule produces neither text nor keysym, ignored", describe(rule));
            return Insertion::Ignored;
        }

        match node_budget(self.table.nodes.len(), sequence.len()) {
            NodeBudget::Fits => {}
            NodeBudget::NearLimit => self.report_node_limit(),
            NodeBudget::Exhausted => {
                self.report_node_limit();
                return Insertion::Ignored;
            }
        }

        let text = self.intern(&text);
        let keysym = rule.output.keysym.unwrap_or(Keysym::NO_SYMBOL);

        let mut link = Link::Eq(ROOT);
        let mut pos = 0;
        let mut extended = false;
        loop {
            let current = self.follow(link);
            if current == NULL {
                let suffix = self.graft(&sequence[pos..], text, keysym);
                self.set_link(link, suffix);
                self.table.entries += 1;
                log::trace!("{}: added", describe(rule));
                return if extended {
                    Insertion::ExtendedPrefix
                } else {
                    Insertion::Added
                };
            }

            let node = self.table.nodes[current as usize];
            match sequence[pos].cmp(&node.keysym) {
                std::cmp::Ordering::Less => {
                    link = Link::Lo(current);
                    continue;
                }
                std::cmp::Ordering::Greater => {
                    link = Link::Hi(current);
                    continue;
                }
                std::cmp::Ordering::Equal => {}
            }

            let rule_ends = pos + 1 == sequence.len();
            match decide(node.kind, rule_ends, text, keysym) {
                Decision::Descend => {
                    link = Link::Eq(current);
                    pos += 1;
                }
                Decision::DiscardPrefix => {
                    log::warn!(
                        "{}: sequence is a prefix of longer sequences and is ignored",
                        describe(rule)
                    );
                    return Insertion::DiscardedPrefix;
                }
                Decision::Duplicate => {
                    log::debug!("{}: duplicate sequence ignored", describe(rule));
                    return Insertion::Duplicate;
                }
                Decision::Replace => {
                    log::warn!(
                        "{}: sequence already defined, overriding its result",
                        describe(rule)
                    );
                    self.table.nodes[current as usize].kind = NodeKind::Leaf { text, keysym };
                    return Insertion::Replaced;
                }
                Decision::Extend => {
                    log::warn!(
                        "{}: a shorter sequence is a prefix of this one and is dropped",
                        describe(rule)
                    );
                    // The leaf reports a NULL continuation, so the next step
                    // grafts the remaining keysyms below it.
                    self.table.entries -= 1;
                    extended = true;
                    link = Link::Eq(current);
                    pos += 1;
                }
            }
        }
    }

    fn report_node_limit(&mut self) {
        if !self.node_limit_reported {
            log::warn!(
                "too many sequences; the table is limited to {} nodes, further rules are ignored",
                MAX_COMPOSE_NODES
            );
            self.node_limit_reported = true;
        }
    }

    /// Insert a sequence directly
    pub fn insert_sequence(&mut self, sequence: &[Keysym], output: &Output) -> Insertion {
        self.insert(&Rule::new(sequence, output.text.clone(), output.keysym))
    }

    fn intern(&mut self, text: &str) -> TextId {
        if text.is_empty() {
            return EMPTY_TEXT;
        }
        let idx = match self.table.texts.get_index_of(text) {
            Some(idx) => idx,
            None => self.table.texts.insert_full(Box::from(text)).0,
        };
        idx as TextId
    }

    fn follow(&self, link: Link) -> NodeId {
        match link {
            Link::Lo(id) => self.table.nodes[id as usize].lo,
            Link::Hi(id) => self.table.nodes[id as usize].hi,
            Link::Eq(id) => self.table.nodes[id as usize].eq(),
        }
    }

    /// Point `link` at `target`. Only called on links that are `NULL`.
    fn set_link(&mut self, link: Link, target: NodeId) {
        match link {
            Link::Lo(id) => self.table.nodes[id as usize].lo = target,
            Link::Hi(id) => self.table.nodes[id as usize].hi = target,
            Link::Eq(id) => self.table.nodes[id as usize].kind = NodeKind::Internal { eq: target },
        }
    }

    /// Append a chain of nodes for `suffix` ending in a leaf, returning its head
    fn graft(&mut self, suffix: &[Keysym], text: TextId, keysym: Keysym) -> NodeId {
        let head = self.table.nodes.len() as NodeId;
        for (idx, &sym) in suffix.iter().enumerate() {
            let kind = if idx + 1 == suffix.len() {
                NodeKind::Leaf { text, keysym }
            } else {
                NodeKind::Internal {
                    eq: head + idx as NodeId + 1,
                }
            };
            self.table.nodes.push(Node::new(sym, kind));
        }
        head
    }
}

fn describe(rule: &Rule) -> String {
    match &rule.location {
        Some(location) => location.to_string(),
        None => {
            let names: Vec<String> = rule.sequence.iter().map(|k| format!("<{}>", k)).collect();
            names.join(" ")
        }
    }
}
