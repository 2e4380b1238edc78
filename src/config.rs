//! Configuration loading for scopedb.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::blog::Blog;
use crate::error::{Error, Result};

pub const IN_MEMORY: &str = ":memory:";

/// Demo settings, read from `settings.json`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Database path; `:memory:` for a private in-memory database.
    pub database: String,
    pub log_level: String,
    /// Directory for rolling log files. Console-only when unset.
    pub log_dir: Option<PathBuf>,
    /// Row inserted by every demo.
    pub blog: Blog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: IN_MEMORY.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
            blog: Blog::default(),
        }
    }
}

/// Get the scopedb config directory.
pub fn get_config_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "scopedb", "scopedb")
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    Ok(dirs.config_dir().to_path_buf())
}

/// Get the default settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("settings.json"))
}

/// Load settings from an explicit file.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load the default settings file, or defaults when it is missing or broken.
pub fn load_settings_or_default() -> Settings {
    let path = match get_settings_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!("No config directory: {}, using defaults", e);
            return Settings::default();
        }
    };
    if !path.exists() {
        return Settings::default();
    }
    load_settings(&path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.database.trim().is_empty() {
        return Err(Error::Config("database cannot be empty".to_string()));
    }
    if settings.blog.name.is_empty() {
        return Err(Error::Config("blog.name cannot be empty".to_string()));
    }
    Ok(())
}
