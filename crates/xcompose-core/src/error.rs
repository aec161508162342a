// XCompose Errors
// Failures surfaced while compiling a Compose file

use std::fmt;
use std::sync::Arc;

use crate::escape::CodecError;

/// A position inside a Compose source, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub source: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(source: impl Into<Arc<str>>, line: usize, column: usize) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// Compose compilation errors.
///
/// None of these are recovered from: a file that fails anywhere yields no
/// table at all.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("{location}: {reason}")]
    MalformedSyntax { location: Location, reason: String },

    #[error("{location}: {reason}; supported file encodings are ASCII and UTF-8")]
    Encoding { location: Location, reason: String },

    #[error("{location}: maximum include depth ({max}) exceeded; maybe there is an include loop?")]
    IncludeDepthExceeded { location: Location, max: usize },

    #[error("{location}: failed to include \"{path}\": {reason}")]
    Include {
        location: Location,
        path: String,
        reason: String,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComposeError {
    /// Where the error was detected, when it refers to a source position
    pub fn location(&self) -> Option<&Location> {
        match self {
            ComposeError::MalformedSyntax { location, .. }
            | ComposeError::Encoding { location, .. }
            | ComposeError::IncludeDepthExceeded { location, .. }
            | ComposeError::Include { location, .. } => Some(location),
            ComposeError::Codec(_) | ComposeError::Io(_) => None,
        }
    }

    pub(crate) fn syntax(location: Location, reason: impl Into<String>) -> Self {
        ComposeError::MalformedSyntax {
            location,
            reason: reason.into(),
        }
    }
}

pub type ComposeResult<T> = Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let location = Location::new("Compose", 3, 14);
        assert_eq!(location.to_string(), "Compose:3:14");
    }

    #[test]
    fn test_error_display() {
        let err = ComposeError::syntax(Location::new("(buffer)", 1, 5), "unexpected token");
        assert_eq!(err.to_string(), "(buffer):1:5: unexpected token");
        assert_eq!(err.location().map(|l| l.line), Some(1));

        let err = ComposeError::IncludeDepthExceeded {
            location: Location::new("a", 2, 1),
            max: 5,
        };
        assert!(err.to_string().contains("maximum include depth (5)"));
    }
}
