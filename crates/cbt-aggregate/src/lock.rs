//! Cross-process lock manager
//!
//! Builders of the same aggregate serialize on a lock named after a digest
//! of the output path. Digesting keeps lock names short and free of path
//! separators whatever the key looks like. The default lock directory is
//! machine-wide so builds from different sessions on one host still see
//! each other, and it is created writable by every account.

use crate::{Error, Result};
use cbt_fs::{FileLock, LockState, NormalizedPath, checksum};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default bound on waiting for another builder; copies over network
/// shares can take a long time.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const LOCK_NAME_LEN: usize = 32;
const LOCK_DIR_NAME: &str = "cbt-locks";

/// A held lock; released exactly once, when dropped.
pub struct LockGuard {
    key: String,
    _held: Box<dyn Send>,
}

impl LockGuard {
    /// Wrap whatever keeps the underlying lock alive.
    pub fn new(key: impl Into<String>, held: impl Send + 'static) -> Self {
        Self {
            key: key.into(),
            _held: Box::new(held),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        tracing::debug!(key = %self.key, "Releasing lock");
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").field("key", &self.key).finish()
    }
}

/// Named mutual exclusion shared between processes.
pub trait LockProvider: Send + Sync {
    /// Block until the lock for `key` is held or `timeout` passes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] when the wait exceeds `timeout`. A
    /// lock abandoned by a dead holder counts as acquired.
    fn acquire(&self, key: &str, timeout: Duration) -> Result<LockGuard>;
}

/// Run `body` while holding the lock for `key`.
///
/// `body` is not invoked when acquisition fails. The lock is released on
/// every exit path, including errors and panics from `body`.
pub fn with_lock<T>(
    provider: &dyn LockProvider,
    key: &str,
    timeout: Duration,
    body: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let _guard = provider.acquire(key, timeout)?;
    body()
}

/// fs2-backed lock files in a machine-wide directory
#[derive(Debug, Clone)]
pub struct MachineLockProvider {
    lock_dir: PathBuf,
}

impl MachineLockProvider {
    pub fn new(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            lock_dir: lock_dir.into(),
        }
    }

    /// `%ProgramData%\cbt-locks` on Windows, `<temp>/cbt-locks` elsewhere.
    pub fn default_lock_dir() -> PathBuf {
        #[cfg(windows)]
        if let Some(program_data) = std::env::var_os("ProgramData") {
            return PathBuf::from(program_data).join(LOCK_DIR_NAME);
        }
        std::env::temp_dir().join(LOCK_DIR_NAME)
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Lock file used for `key`.
    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.lock_dir.join(format!("{}.lock", lock_name(key)))
    }
}

impl Default for MachineLockProvider {
    fn default() -> Self {
        Self::new(Self::default_lock_dir())
    }
}

impl LockProvider for MachineLockProvider {
    fn acquire(&self, key: &str, timeout: Duration) -> Result<LockGuard> {
        let path = self.lock_path(key);
        tracing::debug!(key, lock = %path.display(), "Acquiring lock");

        let (lock, state) = FileLock::acquire_shared(&path, timeout).map_err(|e| match e {
            cbt_fs::Error::LockTimeout { timeout, .. } => Error::LockTimeout {
                key: key.to_string(),
                timeout,
            },
            other => Error::Fs(other),
        })?;

        if let LockState::Abandoned { previous_owner } = state {
            tracing::warn!(
                key,
                previous_owner = %previous_owner,
                "Lock was abandoned by a process that exited while holding it; continuing"
            );
        }

        Ok(LockGuard::new(key, lock))
    }
}

/// Digest of the case-folded, normalized key.
pub fn lock_name(key: &str) -> String {
    checksum::short_digest(&NormalizedPath::new(key).case_key(), LOCK_NAME_LEN)
}
