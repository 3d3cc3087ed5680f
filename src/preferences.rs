//! Theme preference
//!
//! A single `theme` key (`"dark"` or `"light"`) in a small JSON key-value
//! file. Read at startup, written on toggle. A missing or unreadable file
//! falls back to the configured default.

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Key under which the theme is stored
pub const THEME_KEY: &str = "theme";

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(PreferenceError::InvalidTheme(other.to_string())),
        }
    }
}

/// Errors that can occur reading or writing preferences
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("IO error on {path:?}: {error}")]
    Io { path: PathBuf, error: std::io::Error },

    #[error("Invalid preferences file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Unknown theme '{0}', expected 'dark' or 'light'")]
    InvalidTheme(String),
}

/// File-backed key-value preferences
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    default_theme: Theme,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>, default_theme: Theme) -> Self {
        Self {
            path: path.into(),
            default_theme,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, or the default when nothing valid is stored
    pub fn theme(&self) -> Theme {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable preferences");
                return self.default_theme;
            }
        };

        match entries.get(THEME_KEY).and_then(Value::as_str) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring stored theme");
                self.default_theme
            }),
            None => self.default_theme,
        }
    }

    /// Persist `theme`, keeping any other keys in the file
    pub fn set_theme(&self, theme: Theme) -> Result<(), PreferenceError> {
        // A corrupt file is overwritten rather than blocking the write
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(THEME_KEY.to_string(), Value::String(theme.as_str().to_string()));
        self.write_entries(&entries)?;

        tracing::debug!(theme = %theme, path = ?self.path, "Theme saved");
        Ok(())
    }

    /// Flip and persist the theme, returning the new value
    pub fn toggle_theme(&self) -> Result<Theme, PreferenceError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    fn read_entries(&self) -> Result<Map<String, Value>, PreferenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    error,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content).map_err(|e| PreferenceError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), PreferenceError> {
        let io_err = |error| PreferenceError::Io {
            path: self.path.clone(),
            error,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|e| PreferenceError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}

/// `{data_local_dir}/dattebayo/prefs.json`, or `./dattebayo_prefs.json`
pub fn default_prefs_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("dattebayo").join("prefs.json"))
        .unwrap_or_else(|| PathBuf::from("./dattebayo_prefs.json"))
}
