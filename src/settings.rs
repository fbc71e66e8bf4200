//! Persisted user settings.
//!
//! A small JSON file in the home directory holding the database URL and the
//! name of the currently logged-in user.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GatorError, Result};

/// Settings file name, placed in the user's home directory.
pub const SETTINGS_FILE_NAME: &str = ".gatorconfig.json";

/// Environment variable overriding the settings file location.
pub const SETTINGS_PATH_ENV: &str = "GATOR_SETTINGS";

/// Database URL and current user, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Database connection string (e.g. `sqlite://gator.db`).
    pub db_url: String,
    /// Name of the logged-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_name: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Settings {
    /// Resolve the settings path: `$GATOR_SETTINGS`, else `~/.gatorconfig.json`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| GatorError::Settings("cannot locate home directory".to_string()))?;
        Ok(home.join(SETTINGS_FILE_NAME))
    }

    /// Read settings from the default location.
    pub fn read() -> Result<Self> {
        Self::read_from(Self::default_path()?)
    }

    /// Read settings from a specific file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatorError::Settings(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut settings: Settings = serde_json::from_str(&content).map_err(|e| {
            GatorError::Settings(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if settings.current_user_name.as_deref() == Some("") {
            settings.current_user_name = None;
        }
        settings.path = path.to_path_buf();
        Ok(settings)
    }

    /// Create settings bound to a file without reading it.
    pub fn new(db_url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            db_url: db_url.into(),
            current_user_name: None,
            path: path.into(),
        }
    }

    /// Location the settings are written back to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set the current user and persist.
    pub fn set_user(&mut self, name: impl Into<String>) -> Result<()> {
        self.current_user_name = Some(name.into());
        self.write()
    }

    /// Write settings back to their file.
    pub fn write(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GatorError::Settings(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| {
            GatorError::Settings(format!("failed to write {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
