// XCompose Modifier Qualifiers
// Modifier lists that may precede each keysym on a rule's left-hand side

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use strum_macros::{Display, EnumIter, EnumString};

/// A modifier name accepted in a compose rule.
///
/// Spellings are case-sensitive. `Caps` is an alias of `Lock` and `Meta`
/// an alias of `Alt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Modifier {
    #[strum(to_string = "Shift")]
    Shift,
    #[strum(to_string = "Lock", serialize = "Caps")]
    Lock,
    #[strum(to_string = "Ctrl")]
    Ctrl,
    #[strum(to_string = "Alt", serialize = "Meta")]
    Alt,
}

impl Modifier {
    /// Bit of this modifier in a [`ModMask`]
    pub fn mask(self) -> ModMask {
        ModMask(match self {
            Modifier::Shift => 1 << 0,
            Modifier::Lock => 1 << 1,
            Modifier::Ctrl => 1 << 2,
            Modifier::Alt => 1 << 3,
        })
    }
}

/// A set of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModMask(u8);

impl ModMask {
    pub const EMPTY: ModMask = ModMask(0);
    pub const ALL: ModMask = ModMask(0b1111);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: ModMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ModMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn remove(&mut self, other: ModMask) {
        self.0 &= !other.0;
    }
}

impl BitOr for ModMask {
    type Output = ModMask;

    fn bitor(self, rhs: ModMask) -> ModMask {
        ModMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModMask {
    fn bitor_assign(&mut self, rhs: ModMask) {
        self.0 |= rhs.0;
    }
}

/// The modifier qualifier attached to one position of a sequence.
///
/// The intended matching is `(active & mask) == mods`. Qualifiers are
/// parsed and validated but never evaluated: the compose state machine
/// ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierSpec {
    pub mask: ModMask,
    pub mods: ModMask,
}

impl ModifierSpec {
    /// A position with no qualifier at all
    pub fn is_unqualified(&self) -> bool {
        *self == ModifierSpec::default()
    }
}

/// Errors found while validating a modifier list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModifierError {
    #[error("unrecognized modifier \"{0}\"")]
    Unknown(String),

    #[error("\"!\" must start a modifier list")]
    MisplacedBang,

    #[error("\"None\" cannot be combined with other modifiers")]
    MisplacedNone,

    #[error("modifier {0} appears more than once in the same list")]
    Duplicate(Modifier),
}

/// Incremental validator for one modifier list.
///
/// Grammar: `MODIFIER_LIST ::= (["!"] {["~"] MODIFIER_NAME}) | "None"`.
#[derive(Debug, Clone, Default)]
pub struct ModifierListBuilder {
    spec: ModifierSpec,
    exact: bool,
    none: bool,
    seen: ModMask,
}

impl ModifierListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing has been added to the list yet
    pub fn is_empty(&self) -> bool {
        !self.exact && !self.none && self.seen == ModMask::EMPTY
    }

    /// `!`: the listed modifiers must match exactly
    pub fn bang(&mut self) -> Result<(), ModifierError> {
        if !self.is_empty() {
            return Err(ModifierError::MisplacedBang);
        }
        self.exact = true;
        self.spec.mask = ModMask::ALL;
        Ok(())
    }

    /// `None`: no modifier may be active
    pub fn none(&mut self) -> Result<(), ModifierError> {
        if !self.is_empty() {
            return Err(ModifierError::MisplacedNone);
        }
        self.none = true;
        self.spec.mask = ModMask::ALL;
        self.spec.mods = ModMask::EMPTY;
        Ok(())
    }

    /// `Name` or `~Name`
    pub fn add(&mut self, name: &str, negated: bool) -> Result<(), ModifierError> {
        let modifier: Modifier = name
            .parse()
            .map_err(|_| ModifierError::Unknown(name.to_string()))?;
        if self.none {
            return Err(ModifierError::MisplacedNone);
        }
        let bit = modifier.mask();
        if self.seen.intersects(bit) {
            return Err(ModifierError::Duplicate(modifier));
        }
        self.seen |= bit;
        self.spec.mask |= bit;
        if negated {
            self.spec.mods.remove(bit);
        } else {
            self.spec.mods |= bit;
        }
        Ok(())
    }

    /// Close the list and reset the builder for the next position
    pub fn finish(&mut self) -> ModifierSpec {
        std::mem::take(self).spec
    }
}

impl fmt::Display for ModifierSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use strum::IntoEnumIterator;

        let mut first = true;
        for modifier in Modifier::iter() {
            let bit = modifier.mask();
            if !self.mask.contains(bit) {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if !self.mods.contains(bit) {
                f.write_str("~")?;
            }
            write!(f, "{}", modifier)?;
        }
        Ok(())
    }
}
