// XCompose Rule Model
// One parsed compose production: sequence, qualifiers and output

use smallvec::SmallVec;

use crate::error::Location;
use crate::keysym::Keysym;
use crate::modifier::ModifierSpec;

/// Maximum number of keysyms on a rule's left-hand side
pub const MAX_SEQUENCE_LEN: usize = 10;

/// Maximum size of a result string, terminator included
pub const MAX_STRING_SIZE: usize = 256;

/// Maximum nesting of `include` lines
pub const MAX_INCLUDE_DEPTH: usize = 5;

/// A left-hand side key sequence
pub type Sequence = SmallVec<[Keysym; MAX_SEQUENCE_LEN]>;

/// What a completed sequence produces
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Output {
    /// UTF-8 text, empty when the rule only names a keysym
    pub text: String,
    /// Result keysym, `None` when the rule only gives a string
    pub keysym: Option<Keysym>,
}

impl Output {
    pub fn new(text: impl Into<String>, keysym: Option<Keysym>) -> Self {
        Self {
            text: text.into(),
            keysym,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.keysym.is_none()
    }
}

/// A parsed compose rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub sequence: Sequence,
    /// One qualifier per sequence position
    pub modifiers: SmallVec<[ModifierSpec; MAX_SEQUENCE_LEN]>,
    pub output: Output,
    /// Where the rule was read from, if it came from text
    pub location: Option<Location>,
}

impl Rule {
    /// Build an unqualified rule directly from keysyms
    pub fn new(sequence: &[Keysym], text: impl Into<String>, keysym: Option<Keysym>) -> Self {
        Self {
            sequence: sequence.iter().copied().collect(),
            modifiers: sequence.iter().map(|_| ModifierSpec::default()).collect(),
            output: Output::new(text, keysym),
            location: None,
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
