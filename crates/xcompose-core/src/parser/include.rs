// XCompose Include Resolution
// Turns the path of an `include` line into the bytes of the included file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default system directory for Compose files (`%S`)
pub const DEFAULT_XLOCALEDIR: &str = "/usr/share/X11/locale";

/// The contents of an included file
#[derive(Debug, Clone)]
pub struct IncludeSource {
    /// Name used in diagnostics for positions inside the included file
    pub name: String,
    pub contents: Vec<u8>,
}

/// Errors raised while resolving an include target
#[derive(Debug, thiserror::Error)]
pub enum IncludeError {
    #[error("include statements are not supported for this input")]
    Unsupported,

    #[error("%H was used in an include statement, but the home directory is unknown")]
    NoHome,

    #[error("%L was used in an include statement, but no locale Compose file is configured")]
    NoLocaleFile,

    #[error("unknown % format ({0}) in include statement")]
    UnknownFormat(String),

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Provides the bytes behind an `include "..."` line.
///
/// `path` is the text between the quotes, before any `%` expansion.
pub trait IncludeResolver {
    fn resolve(&self, path: &str) -> Result<IncludeSource, IncludeError>;
}

/// Rejects every include.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&self, _path: &str) -> Result<IncludeSource, IncludeError> {
        Err(IncludeError::Unsupported)
    }
}

/// Serves includes from a fixed set of in-memory files, keyed by the raw
/// include path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIncludes {
    files: HashMap<String, Vec<u8>>,
}

impl InMemoryIncludes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl IncludeResolver for InMemoryIncludes {
    fn resolve(&self, path: &str) -> Result<IncludeSource, IncludeError> {
        self.files
            .get(path)
            .map(|contents| IncludeSource {
                name: path.to_string(),
                contents: contents.clone(),
            })
            .ok_or(IncludeError::NotFound)
    }
}

/// Reads includes from the filesystem after expanding `%` sequences.
///
/// - `%%` expands to `%`
/// - `%H` to the home directory
/// - `%L` to the locale Compose file
/// - `%S` to the system Compose directory
#[derive(Debug, Clone)]
pub struct FsIncludeResolver {
    home: Option<PathBuf>,
    xlocaledir: PathBuf,
    locale_compose_file: Option<PathBuf>,
}

impl Default for FsIncludeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FsIncludeResolver {
    /// Resolver using the user's home directory and `$XLOCALEDIR` (or the
    /// default system directory)
    pub fn new() -> Self {
        let xlocaledir = std::env::var_os("XLOCALEDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_XLOCALEDIR));
        Self {
            home: dirs::home_dir(),
            xlocaledir,
            locale_compose_file: None,
        }
    }

    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn with_xlocaledir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.xlocaledir = dir.into();
        self
    }

    pub fn with_locale_compose_file(mut self, path: Option<PathBuf>) -> Self {
        self.locale_compose_file = path;
        self
    }

    pub fn xlocaledir(&self) -> &Path {
        &self.xlocaledir
    }

    /// Expand the `%` sequences of an include path
    pub fn expand(&self, raw: &str) -> Result<PathBuf, IncludeError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('%') => out.push('%'),
                Some('H') => {
                    let home = self.home.as_ref().ok_or(IncludeError::NoHome)?;
                    out.push_str(&home.to_string_lossy());
                }
                Some('L') => {
                    let path = self
                        .locale_compose_file
                        .as_ref()
                        .ok_or(IncludeError::NoLocaleFile)?;
                    out.push_str(&path.to_string_lossy());
                }
                Some('S') => out.push_str(&self.xlocaledir.to_string_lossy()),
                Some(other) => return Err(IncludeError::UnknownFormat(other.to_string())),
                None => return Err(IncludeError::UnknownFormat(String::new())),
            }
        }
        Ok(PathBuf::from(out))
    }
}

impl IncludeResolver for FsIncludeResolver {
    fn resolve(&self, path: &str) -> Result<IncludeSource, IncludeError> {
        let expanded = self.expand(path)?;
        let contents = std::fs::read(&expanded)?;
        Ok(IncludeSource {
            name: expanded.to_string_lossy().into_owned(),
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> FsIncludeResolver {
        FsIncludeResolver::new()
            .with_home(Some(PathBuf::from("/home/user")))
            .with_xlocaledir("/usr/share/X11/locale")
            .with_locale_compose_file(Some(PathBuf::from("/usr/share/X11/locale/en_US.UTF-8/Compose")))
    }

    #[test]
    fn test_expand_plain() {
        assert_eq!(resolver().expand("/etc/Compose").unwrap(), PathBuf::from("/etc/Compose"));
    }

    #[test]
    fn test_expand_sequences() {
        let r = resolver();
        assert_eq!(r.expand("%H/.XCompose").unwrap(), PathBuf::from("/home/user/.XCompose"));
        assert_eq!(
            r.expand("%S/en_US.UTF-8/Compose").unwrap(),
            PathBuf::from("/usr/share/X11/locale/en_US.UTF-8/Compose")
        );
        assert_eq!(
            r.expand("%L").unwrap(),
            PathBuf::from("/usr/share/X11/locale/en_US.UTF-8/Compose")
        );
        assert_eq!(r.expand("100%%").unwrap(), PathBuf::from("100%"));
    }

    #[test]
    fn test_expand_errors() {
        let r = resolver().with_home(None).with_locale_compose_file(None);
        assert!(matches!(r.expand("%H/x"), Err(IncludeError::NoHome)));
        assert!(matches!(r.expand("%L"), Err(IncludeError::NoLocaleFile)));
        assert!(matches!(r.expand("%Q"), Err(IncludeError::UnknownFormat(f)) if f == "Q"));
        assert!(matches!(r.expand("trailing%"), Err(IncludeError::UnknownFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let r = resolver();
        assert!(matches!(
            r.resolve("/nonexistent/xcompose/Compose"),
            Err(IncludeError::Io(_))
        ));
    }

    #[test]
    fn test_in_memory() {
        let includes = InMemoryIncludes::new().with_file("a", "<a> : b\n");
        assert_eq!(includes.resolve("a").unwrap().contents, b"<a> : b\n");
        assert!(matches!(includes.resolve("b"), Err(IncludeError::NotFound)));
        assert!(matches!(NoIncludes.resolve("a"), Err(IncludeError::Unsupported)));
    }
}
