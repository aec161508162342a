// XCompose State Machine
// Per-session compose state driven by live keysyms

use std::sync::Arc;

use strum_macros::Display;

use crate::keysym::Keysym;
use crate::table::{ComposeTable, NodeId, NodeKind};

/// Status of a compose session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    /// No sequence in progress
    #[default]
    Idle,
    /// Part of a sequence has been typed
    Composing,
    /// A sequence was completed; its result is available
    Composed,
    /// The keysyms typed so far match no sequence
    Cancelled,
}

/// Whether [`ComposeState::feed`] looked at the keysym
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FeedResult {
    /// Modifier keysym; the state did not change
    Ignored,
    /// The keysym was processed
    Accepted,
}

/// A compose session over a shared table.
///
/// Sessions are cheap: they only hold a position in the table. Many of
/// them can share one table, across threads.
#[derive(Debug, Clone)]
pub struct ComposeState {
    table: Arc<ComposeTable>,
    position: NodeId,
    status: Status,
    /// Leaf reached by the last completed sequence
    leaf: Option<NodeId>,
}

impl ComposeState {
    pub fn new(table: Arc<ComposeTable>) -> Self {
        let position = table.first();
        Self {
            table,
            position,
            status: Status::Idle,
            leaf: None,
        }
    }

    pub fn table(&self) -> &Arc<ComposeTable> {
        &self.table
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Feed one keysym.
    ///
    /// Modifier keysyms are ignored. A completed or cancelled sequence is
    /// reset before the keysym is processed.
    pub fn feed(&mut self, keysym: Keysym) -> FeedResult {
        if keysym.is_modifier() {
            return FeedResult::Ignored;
        }

        if matches!(self.status, Status::Composed | Status::Cancelled) {
            self.reset();
        }

        let Some(id) = self.table.find(self.position, keysym) else {
            if self.status == Status::Composing {
                log::trace!("{}: no sequence continues here, cancelled", keysym);
                self.status = Status::Cancelled;
            }
            return FeedResult::Accepted;
        };

        match self.table.node(id).kind {
            NodeKind::Leaf { .. } => {
                self.status = Status::Composed;
                self.leaf = Some(id);
            }
            NodeKind::Internal { eq } => {
                self.status = Status::Composing;
                self.position = eq;
            }
        }
        FeedResult::Accepted
    }

    /// Drop any sequence in progress
    pub fn reset(&mut self) {
        self.position = self.table.first();
        self.status = Status::Idle;
        self.leaf = None;
    }

    fn composed(&self) -> Option<NodeKind> {
        match (self.status, self.leaf) {
            (Status::Composed, Some(id)) => Some(self.table.node(id).kind),
            _ => None,
        }
    }

    /// Text produced by the completed sequence; empty unless composed
    pub fn utf8(&self) -> &str {
        match self.composed() {
            Some(NodeKind::Leaf { text, .. }) => self.table.text(text),
            _ => "",
        }
    }

    /// Keysym produced by the completed sequence, if any
    pub fn keysym(&self) -> Option<Keysym> {
        match self.composed() {
            Some(NodeKind::Leaf { keysym, .. }) if !keysym.is_none() => Some(keysym),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysym::keysym_from_name;

    fn ks(name: &str) -> Keysym {
        keysym_from_name(name).unwrap()
    }

    fn state(rules: &str) -> ComposeState {
        ComposeState::new(Arc::new(rules.parse().unwrap()))
    }

    #[test]
    fn test_initial_state() {
        let state = state("<a> : \"x\"\n");
        assert_eq!(state.status(), Status::Idle);
        assert_eq!(state.utf8(), "");
        assert_eq!(state.keysym(), None);
    }

    #[test]
    fn test_compose_sequence() {
        let mut state = state("<dead_acute> <a> : \"á\" aacute\n");
        assert_eq!(state.feed(ks("dead_acute")), FeedResult::Accepted);
        assert_eq!(state.status(), Status::Composing);
        assert_eq!(state.utf8(), "");
        assert_eq!(state.feed(ks("a")), FeedResult::Accepted);
        assert_eq!(state.status(), Status::Composed);
        assert_eq!(state.utf8(), "á");
        assert_eq!(state.keysym(), Some(ks("aacute")));
    }

    #[test]
    fn test_modifiers_are_ignored_in_any_state() {
        let mut state = state("<dead_acute> <a> : \"á\"\n");
        assert_eq!(state.feed(ks("Caps_Lock")), FeedResult::Ignored);
        assert_eq!(state.status(), Status::Idle);

        state.feed(ks("dead_acute"));
        assert_eq!(state.feed(ks("Shift_L")), FeedResult::Ignored);
        assert_eq!(state.status(), Status::Composing);

        state.feed(ks("a"));
        assert_eq!(state.feed(ks("Caps_Lock")), FeedResult::Ignored);
        assert_eq!(state.status(), Status::Composed);
        assert_eq!(state.utf8(), "á");
    }

    #[test]
    fn test_reset() {
        let mut state = state("<dead_acute> <a> : \"á\"\n");
        state.feed(ks("dead_acute"));
        state.reset();
        assert_eq!(state.status(), Status::Idle);
        state.reset();
        assert_eq!(state.status(), Status::Idle);
        state.feed(ks("a"));
        assert_eq!(state.status(), Status::Idle);
    }

    #[test]
    fn test_no_symbol_is_unmatched() {
        let mut state = state("<a> : \"x\"\n");
        assert_eq!(state.feed(Keysym::NO_SYMBOL), FeedResult::Accepted);
        assert_eq!(state.status(), Status::Idle);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Composing.to_string(), "composing");
        assert_eq!(FeedResult::Ignored.to_string(), "ignored");
    }

    #[test]
    fn test_sessions_share_a_table() {
        let table: Arc<ComposeTable> = Arc::new("<a> <b> : \"x\"\n".parse().unwrap());
        let mut first = ComposeState::new(table.clone());
        let mut second = ComposeState::new(table);
        first.feed(ks("a"));
        second.feed(ks("b"));
        assert_eq!(first.status(), Status::Composing);
        assert_eq!(second.status(), Status::Idle);
    }
}
