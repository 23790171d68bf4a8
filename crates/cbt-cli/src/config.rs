//! Settings shared by the commands
//!
//! Resolution order: built-in defaults, then the settings file, then
//! command-line flags (applied by each command).

use crate::error::{CliError, Result};
use cbt_aggregate::{DEFAULT_LOCK_TIMEOUT, MachineLockProvider};
use cbt_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cbt.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds to wait for a lock held by another process
    pub lock_timeout_secs: u64,
    pub lock_dir: PathBuf,
    /// NuGet global packages folder; `~/.nuget/packages` when unset
    pub packages_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT.as_secs(),
            lock_dir: MachineLockProvider::default_lock_dir(),
            packages_root: None,
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from `./cbt.toml` when it exists.
    ///
    /// An explicit file that does not exist is an error; a missing default
    /// file just means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::user(format!(
                        "Settings file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from(path)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load_from(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let settings: Self = ConfigStore::new().load(&NormalizedPath::new(path))?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}
