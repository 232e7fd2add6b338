//! XDG Base Directory support.

use std::path::{Path, PathBuf};

/// Application directory name under the XDG base directories.
const APP_DIR: &str = "lochat";

/// Default config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// XDG directory paths for lochat.
///
/// Transcripts are never persisted, so only the config directory is needed.
#[derive(Debug, Clone)]
pub struct XdgDirs {
    /// Config directory (~/.config/lochat or XDG_CONFIG_HOME/lochat)
    pub config: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        Self::from_base(config_home, &home)
    }

    /// Build the directories from an explicit `XDG_CONFIG_HOME` value and home dir.
    pub fn from_base(config_home: Option<PathBuf>, home: &Path) -> Self {
        let config_home = config_home
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| home.join(".config"));

        Self {
            config: config_home.join(APP_DIR),
        }
    }

    /// Path of the default config file.
    pub fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE)
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
