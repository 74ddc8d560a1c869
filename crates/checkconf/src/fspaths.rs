//! Default filesystem locations for Sensu configuration.
//!
//! These are pure functions of an explicit [`Platform`] value. Nothing here
//! consults global state, so path resolution is deterministic in tests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Etc directory on non-Windows platforms.
pub const UNIX_ETC_DIR: &str = "/etc/sensu";

/// Etc directory on Windows.
pub const WINDOWS_ETC_DIR: &str = "C:/opt/sensu";

/// The platform family that decides the default etc directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Unix,
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Unix => write!(f, "unix"),
            Platform::Windows => write!(f, "windows"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unix" | "linux" | "macos" => Ok(Platform::Unix),
            "windows" => Ok(Platform::Windows),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// Resolves the Sensu etc, conf.d and checks directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fspaths {
    platform: Platform,
    etc_dir: Option<PathBuf>,
}

impl Fspaths {
    /// Creates path defaults for the given platform.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            etc_dir: None,
        }
    }

    /// Overrides the etc directory, keeping the `conf.d/checks` layout below it.
    pub fn with_etc_dir(mut self, etc_dir: impl Into<PathBuf>) -> Self {
        self.etc_dir = Some(etc_dir.into());
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The Sensu etc directory.
    pub fn etc_dir(&self) -> PathBuf {
        match &self.etc_dir {
            Some(dir) => dir.clone(),
            None => match self.platform {
                Platform::Unix => PathBuf::from(UNIX_ETC_DIR),
                Platform::Windows => PathBuf::from(WINDOWS_ETC_DIR),
            },
        }
    }

    /// The `conf.d` sub-directory of [`Fspaths::etc_dir`].
    pub fn conf_d(&self) -> PathBuf {
        self.etc_dir().join("conf.d")
    }

    /// The default directory holding one `config_<name>.json` per check.
    pub fn checks_dir(&self) -> PathBuf {
        self.conf_d().join("checks")
    }

    /// Path of the config file for `name` under `base_path`.
    pub fn config_file_in(base_path: &Path, name: &str) -> PathBuf {
        base_path.join(format!("config_{}.json", name))
    }
}

impl Default for Fspaths {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}
