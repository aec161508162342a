// XCompose Core Library
// Compose file parsing, sequence table compilation and compose state

pub mod error;
pub mod escape;
pub mod keysym;
pub mod modifier;
pub mod parser;
pub mod rule;
pub mod state;
pub mod table;

#[cfg(feature = "settings")]
pub mod settings;

pub use error::{ComposeError, ComposeResult, Location};
pub use escape::CodecError;
pub use keysym::{keysym_from_name, keysym_name, BuiltinKeysyms, Keysym, KeysymResolver};
pub use modifier::{ModMask, Modifier, ModifierError, ModifierSpec};
pub use parser::{
    FsIncludeResolver, InMemoryIncludes, IncludeError, IncludeResolver, IncludeSource, NoIncludes,
    Parser,
};
pub use rule::{Output, Rule, Sequence, MAX_INCLUDE_DEPTH, MAX_SEQUENCE_LEN, MAX_STRING_SIZE};
pub use state::{ComposeState, FeedResult, Status};
pub use table::{
    dump, dump_to_string, ComposeTable, Entries, Entry, Insertion, TableBuilder, MAX_COMPOSE_NODES,
};

#[cfg(feature = "settings")]
pub use settings::{Settings, SettingsError};
