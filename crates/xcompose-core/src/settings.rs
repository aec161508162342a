// XCompose Settings Module
// User-configurable paths used to locate Compose files and resolve includes

#![cfg(feature = "settings")]

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::parser::include::{FsIncludeResolver, DEFAULT_XLOCALEDIR};

/// Settings for locating Compose files
///
/// These settings are loaded from a TOML file (default:
/// ~/.config/xcompose/settings.toml). Every field is optional:
///
/// ```toml
/// [paths]
/// home = "/home/user"
/// xlocaledir = "/usr/share/X11/locale"
/// locale_compose_file = "/usr/share/X11/locale/en_US.UTF-8/Compose"
/// compose_file = "/home/user/.XCompose"
/// ```
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Substituted for `%H` in include paths
    home: Option<PathBuf>,

    /// Substituted for `%S`
    xlocaledir: Option<PathBuf>,

    /// Substituted for `%L`
    locale_compose_file: Option<PathBuf>,

    /// The user's Compose file
    compose_file: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    paths: Option<PathSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PathSettings {
    #[serde(default)]
    home: Option<PathBuf>,
    #[serde(default)]
    xlocaledir: Option<PathBuf>,
    #[serde(default)]
    locale_compose_file: Option<PathBuf>,
    #[serde(default)]
    compose_file: Option<PathBuf>,
}

impl Settings {
    /// Create settings with every path left to its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();
        if let Some(paths) = toml_settings.paths {
            settings.home = non_empty(paths.home, "home")?;
            settings.xlocaledir = non_empty(paths.xlocaledir, "xlocaledir")?;
            settings.locale_compose_file = non_empty(paths.locale_compose_file, "locale_compose_file")?;
            settings.compose_file = non_empty(paths.compose_file, "compose_file")?;
        }
        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("xcompose").join("settings.toml"))
    }

    /// Load from default location (~/.config/xcompose/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    /// Home directory: configured, else the user's
    pub fn home(&self) -> Option<PathBuf> {
        self.home.clone().or_else(dirs::home_dir)
    }

    /// System Compose directory: `$XLOCALEDIR`, else configured, else the
    /// default
    pub fn xlocaledir(&self) -> PathBuf {
        self.xlocaledir_with_env(std::env::var_os("XLOCALEDIR"))
    }

    fn xlocaledir_with_env(&self, env: Option<OsString>) -> PathBuf {
        env.filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.xlocaledir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_XLOCALEDIR))
    }

    pub fn locale_compose_file(&self) -> Option<&Path> {
        self.locale_compose_file.as_deref()
    }

    /// The user's Compose file: configured, else `$XCOMPOSEFILE`, else
    /// `~/.XCompose`
    pub fn compose_file(&self) -> Option<PathBuf> {
        self.compose_file_with_env(std::env::var_os("XCOMPOSEFILE"))
    }

    fn compose_file_with_env(&self, env: Option<OsString>) -> Option<PathBuf> {
        if let Some(path) = &self.compose_file {
            return Some(path.clone());
        }
        if let Some(path) = env.filter(|path| !path.is_empty()) {
            return Some(PathBuf::from(path));
        }
        self.home().map(|home| home.join(".XCompose"))
    }

    /// Filesystem include resolver configured from these settings
    pub fn include_resolver(&self) -> FsIncludeResolver {
        FsIncludeResolver::new()
            .with_home(self.home())
            .with_xlocaledir(self.xlocaledir())
            .with_locale_compose_file(self.locale_compose_file.clone())
    }
}

fn non_empty(path: Option<PathBuf>, name: &str) -> Result<Option<PathBuf>, SettingsError> {
    match path {
        Some(path) if path.as_os_str().is_empty() => Err(SettingsError::InvalidValue(format!(
            "{} must not be empty",
            name
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::new();
        assert_eq!(settings.locale_compose_file(), None);
        assert_eq!(
            settings.xlocaledir_with_env(None),
            PathBuf::from(DEFAULT_XLOCALEDIR)
        );
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
[paths]
home = "/home/alice"
xlocaledir = "/opt/X11/locale"
locale_compose_file = "/opt/X11/locale/en_US.UTF-8/Compose"
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.home(), Some(PathBuf::from("/home/alice")));
        assert_eq!(settings.xlocaledir_with_env(None), PathBuf::from("/opt/X11/locale"));
        assert_eq!(
            settings.locale_compose_file(),
            Some(Path::new("/opt/X11/locale/en_US.UTF-8/Compose"))
        );
        assert_eq!(
            settings.compose_file_with_env(None),
            Some(PathBuf::from("/home/alice/.XCompose"))
        );
    }

    #[test]
    fn test_settings_from_file() {
        let path = std::env::temp_dir().join(format!("xcompose-settings-{}.toml", std::process::id()));
        std::fs::write(&path, "[paths]\ncompose_file = \"/etc/Compose\"\n").unwrap();
        let settings = Settings::from_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            settings.unwrap().compose_file_with_env(None),
            Some(PathBuf::from("/etc/Compose"))
        );

        assert!(matches!(
            Settings::from_file("/nonexistent/xcompose/settings.toml"),
            Err(SettingsError::Io(_))
        ));
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.locale_compose_file(), None);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            Settings::from_toml("[paths\n"),
            Err(SettingsError::TomlParse(_))
        ));
        assert!(matches!(
            Settings::from_toml("[paths]\nhome = \"\"\n"),
            Err(SettingsError::InvalidValue(_))
        ));
        assert!(matches!(
            Settings::from_toml("[paths]\nxlocale_dir = \"/x\"\n"),
            Err(SettingsError::TomlParse(_))
        ));
    }

    #[test]
    fn test_xlocaledir_env_wins() {
        let settings = Settings::from_toml("[paths]\nxlocaledir = \"/opt/X11/locale\"\n").unwrap();
        assert_eq!(
            settings.xlocaledir_with_env(Some(OsString::from("/env/locale"))),
            PathBuf::from("/env/locale")
        );
        assert_eq!(
            settings.xlocaledir_with_env(Some(OsString::new())),
            PathBuf::from("/opt/X11/locale")
        );
    }

    #[test]
    fn test_compose_file_precedence() {
        let settings = Settings::from_toml("[paths]\nhome = \"/home/bob\"\n").unwrap();
        assert_eq!(
            settings.compose_file_with_env(Some(OsString::from("/tmp/Compose"))),
            Some(PathBuf::from("/tmp/Compose"))
        );

        let settings = Settings::from_toml(
            "[paths]\nhome = \"/home/bob\"\ncompose_file = \"/etc/Compose\"\n",
        )
        .unwrap();
        assert_eq!(
            settings.compose_file_with_env(Some(OsString::from("/tmp/Compose"))),
            Some(PathBuf::from("/etc/Compose"))
        );
    }

    #[test]
    fn test_include_resolver_uses_settings() {
        let settings = Settings::from_toml(
            "[paths]\nhome = \"/home/carol\"\nlocale_compose_file = \"/l/Compose\"\n",
        )
        .unwrap();
        let resolver = settings.include_resolver();
        assert_eq!(
            resolver.expand("%H/.XCompose").unwrap(),
            PathBuf::from("/home/carol/.XCompose")
        );
        assert_eq!(resolver.expand("%L").unwrap(), PathBuf::from("/l/Compose"));
    }
}
