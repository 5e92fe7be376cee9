//! XDG Base Directory support.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "noai";

/// XDG directory paths for NoAI.
#[derive(Debug, Clone)]
pub struct XdgDirs {
    /// Config directory (~/.config/noai or XDG_CONFIG_HOME/noai)
    pub config: PathBuf,
    /// Cache directory (~/.cache/noai or XDG_CACHE_HOME/noai), holds the log
    pub cache: PathBuf,
}

impl XdgDirs {
    /// Get XDG directories, respecting environment variables.
    pub fn new() -> Self {
        Self::resolve(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("XDG_CACHE_HOME").map(PathBuf::from),
        )
    }

    fn resolve(config_home: Option<PathBuf>, cache_home: Option<PathBuf>) -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        // An empty or relative XDG variable is invalid and must be ignored
        let usable = |p: Option<PathBuf>| p.filter(|p| p.is_absolute());

        Self {
            config: usable(config_home)
                .unwrap_or_else(|| home.join(".config"))
                .join(APP_DIR),
            cache: usable(cache_home)
                .unwrap_or_else(|| home.join(".cache"))
                .join(APP_DIR),
        }
    }

    /// Directories rooted somewhere else, for tests and portable installs.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config: root.join("config").join(APP_DIR),
            cache: root.join("cache").join(APP_DIR),
        }
    }

    /// Settings file location.
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Log file location.
    pub fn log_file(&self) -> PathBuf {
        self.cache.join("noai.log")
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config, &self.cache] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
