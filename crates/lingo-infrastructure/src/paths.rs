//! Path management for lingo settings.
//!
//! Paths are resolved via `AppPaths` from the version-migrate crate, so the
//! layout follows the platform conventions (XDG on Linux/macOS).
//!
//! ```text
//! ~/.config/lingo/
//! └── settings.json    # Settings document (API keys included, mode 600)
//! ```

use std::path::PathBuf;
use thiserror::Error;
use version_migrate::AppPaths;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

/// Settings file name inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub struct LingoPaths;

impl LingoPaths {
    fn app_paths() -> AppPaths {
        AppPaths::new("lingo")
    }

    /// Returns the lingo configuration directory (e.g. `~/.config/lingo/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        Self::app_paths()
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the default settings file path.
    pub fn settings_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE_NAME))
    }
}
