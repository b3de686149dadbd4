//! Optional `mydot.toml` settings.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::toml_loader;
use crate::error::ConfigError;

/// Name of the settings file looked up in the main directory.
pub const SETTINGS_FILE: &str = "mydot.toml";

/// Run-wide settings read from `<main-dir>/mydot.toml`.
///
/// Every key is optional; a missing file yields [`Settings::default`].
///
/// ```
/// use mydot::config::Settings;
///
/// let settings: Settings = toml::from_str("clone_depth = 0").unwrap();
/// assert_eq!(settings.clone_depth, 0);
/// assert_eq!(settings.remote_url, "https://github.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Default target directory when `--work-dir` is not given.
    pub work_dir: PathBuf,
    /// Repository mirror cache, relative to the main directory.
    pub cache_dir: PathBuf,
    /// Base URL that repository ids are appended to.
    pub remote_url: String,
    /// `--depth` for the initial clone; `0` clones full history.
    pub clone_depth: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("target"),
            cache_dir: PathBuf::from(".repo"),
            remote_url: "https://github.com".to_string(),
            clone_depth: 1,
        }
    }
}

impl Settings {
    /// Load settings from `main_dir`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or holds
    /// an unusable value.
    pub fn load(main_dir: &Path) -> Result<Self> {
        let path = main_dir.join(SETTINGS_FILE);
        let settings: Self = toml_loader::load_config(&path)?;
        settings.validate(&path)?;
        Ok(settings)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |key, message: &str| ConfigError::InvalidValue {
            file: path.display().to_string(),
            key,
            message: message.to_string(),
        };
        if self.remote_url.trim().is_empty() {
            return Err(invalid("remote_url", "must not be empty"));
        }
        if self.cache_dir.is_absolute() {
            return Err(invalid(
                "cache_dir",
                "must be relative to the main directory",
            ));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(invalid("cache_dir", "must not be empty"));
        }
        Ok(())
    }

    /// URL that the repository `repo_id` is cloned from.
    #[must_use]
    pub fn repo_url(&self, repo_id: &str) -> String {
        format!("{}/{repo_id}.git", self.remote_url.trim_end_matches('/'))
    }
}
