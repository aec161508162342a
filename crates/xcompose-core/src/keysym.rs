// XCompose Keysym Type
// Keysym identifiers and the name <-> value lookup used by the parser

use std::fmt;
use std::str::FromStr;

include!(concat!(env!("OUT_DIR"), "/keysym_tables.rs"));

/// Largest value a keysym can take.
pub const KEYSYM_MAX: u32 = 0x1fff_ffff;

const UNICODE_OFFSET: u32 = 0x0100_0000;
const UNICODE_MIN: u32 = 0x0100_0100;
const UNICODE_MAX: u32 = 0x0110_ffff;

/// A single key symbol.
///
/// Newtype around the X11 keysym value. Ordering is by value, which is the
/// order used by the compose table when comparing siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Keysym(pub u32);

impl Keysym {
    /// The reserved "no symbol" value.
    pub const NO_SYMBOL: Keysym = Keysym(0);

    pub const SHIFT_L: Keysym = Keysym(0xffe1);
    pub const HYPER_R: Keysym = Keysym(0xffee);
    pub const CAPS_LOCK: Keysym = Keysym(0xffe5);
    pub const ISO_LOCK: Keysym = Keysym(0xfe01);
    pub const ISO_LAST_GROUP_LOCK: Keysym = Keysym(0xfe0f);
    pub const MODE_SWITCH: Keysym = Keysym(0xff7e);
    pub const NUM_LOCK: Keysym = Keysym(0xff7f);
    pub const MULTI_KEY: Keysym = Keysym(0xff20);

    /// Get the raw keysym value
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Whether this is the `NoSymbol` sentinel
    pub fn is_none(self) -> bool {
        self == Self::NO_SYMBOL
    }

    /// Whether this keysym belongs to the modifier family.
    ///
    /// Modifiers never take part in a compose sequence; feeding one leaves
    /// the compose state untouched. This mirrors what libX11 considers a
    /// modifier keysym, since the keymap is not available here.
    pub fn is_modifier(self) -> bool {
        (Self::SHIFT_L..=Self::HYPER_R).contains(&self)
            || (Self::ISO_LOCK..=Self::ISO_LAST_GROUP_LOCK).contains(&self)
            || self == Self::MODE_SWITCH
            || self == Self::NUM_LOCK
    }

    /// The canonical name of this keysym, if it has one in the builtin table
    pub fn builtin_name(self) -> Option<&'static str> {
        KEYSYMS_BY_VALUE
            .binary_search_by_key(&self.0, |(value, _)| *value)
            .ok()
            .map(|idx| KEYSYMS_BY_VALUE[idx].1)
    }
}

impl From<u32> for Keysym {
    fn from(value: u32) -> Self {
        Keysym(value)
    }
}

impl From<Keysym> for u32 {
    fn from(keysym: Keysym) -> Self {
        keysym.0
    }
}

impl fmt::Display for Keysym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&keysym_name(*self))
    }
}

impl FromStr for Keysym {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        keysym_from_name(s).ok_or_else(|| format!("Unknown keysym: {}", s))
    }
}

/// Bidirectional keysym name lookup.
///
/// The parser resolves `<name>` tokens and right-hand side keysyms through
/// this trait; the dumper uses it to print them back.
pub trait KeysymResolver {
    /// Resolve a name to a keysym. `None` if the name is unknown.
    fn keysym_from_name(&self, name: &str) -> Option<Keysym>;

    /// Name a keysym so that `keysym_from_name` resolves it back.
    fn keysym_name(&self, keysym: Keysym) -> String;
}

/// Resolver over the builtin keysym table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKeysyms;

impl KeysymResolver for BuiltinKeysyms {
    fn keysym_from_name(&self, name: &str) -> Option<Keysym> {
        keysym_from_name(name)
    }

    fn keysym_name(&self, keysym: Keysym) -> String {
        keysym_name(keysym)
    }
}

/// Look up a keysym by name (case-sensitive).
///
/// Besides the names in the builtin table this accepts `U<hex>` Unicode
/// keysyms and raw `0x<hex>` values.
pub fn keysym_from_name(name: &str) -> Option<Keysym> {
    if let Ok(idx) = KEYSYMS_BY_NAME.binary_search_by(|(n, _)| (*n).cmp(name)) {
        return Some(Keysym(KEYSYMS_BY_NAME[idx].1));
    }

    if let Some(hex) = name.strip_prefix('U') {
        let cp = parse_hex(hex)?;
        return match cp {
            0..=0x1f | 0x7f..=0x9f => None,
            0x20..=0xff => Some(Keysym(cp)),
            0x100..=0x10ffff => Some(Keysym(cp + UNICODE_OFFSET)),
            _ => None,
        };
    }

    if let Some(hex) = name.strip_prefix("0x") {
        let value = parse_hex(hex)?;
        if value == 0 || value > KEYSYM_MAX {
            return None;
        }
        return Some(Keysym(value));
    }

    None
}

/// Name a keysym.
///
/// Keysyms missing from the builtin table are printed as `U<hex>` when they
/// fall in the Unicode range and as `0x<hex>` otherwise.
pub fn keysym_name(keysym: Keysym) -> String {
    if keysym.is_none() {
        return "NoSymbol".to_string();
    }
    if let Some(name) = keysym.builtin_name() {
        return name.to_string();
    }
    if (UNICODE_MIN..=UNICODE_MAX).contains(&keysym.0) {
        return format!("U{:04X}", keysym.0 - UNICODE_OFFSET);
    }
    format!("0x{:08x}", keysym.0)
}

fn parse_hex(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
