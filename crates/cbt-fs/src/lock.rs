//! Advisory cross-process file locks
//!
//! A lock is an `fs2` exclusive lock on a small file. The holder writes an
//! owner record into the file and clears it on release, so a record left
//! behind means the previous holder died while holding the lock. The OS
//! drops the advisory lock itself when a process exits.
//!
//! Lock files are never deleted: removing a file another process may be
//! about to lock would let two holders lock different inodes.
//!
//! [`FileLock::acquire_shared`] is for machine-wide lock directories used by
//! several accounts. On Unix it creates the directory sticky and
//! world-writable (like `/tmp`) and the lock files world-writable, so any
//! user can open a lock another user created.

use crate::{Error, Result};
use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const INITIAL_POLL: Duration = Duration::from_millis(10);
const MAX_POLL: Duration = Duration::from_millis(500);

#[cfg(unix)]
const SHARED_DIR_MODE: u32 = 0o1777;
#[cfg(unix)]
const SHARED_FILE_MODE: u32 = 0o666;

/// Who must be able to open a lock file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    CurrentUser,
    AllUsers,
}

/// How a lock was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// The previous holder released the lock normally (or there was none).
    Fresh,
    /// The previous holder terminated without releasing; `previous_owner`
    /// is the owner record it left behind.
    Abandoned { previous_owner: String },
}

/// An exclusive advisory lock held on a file until dropped.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire the lock at `path`, waiting at most `timeout`.
    ///
    /// Polls with exponential backoff. Creates the lock file and its parent
    /// directory when missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] when the lock is still held by someone
    /// else after `timeout`, or an I/O error if the file cannot be opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<(Self, LockState)> {
        Self::acquire_with(path, timeout, Access::CurrentUser)
    }

    /// Like [`FileLock::acquire`], for a lock other accounts on the machine
    /// must be able to take too.
    ///
    /// A missing parent directory is created open to all users, and the
    /// lock file is made readable and writable by everyone.
    pub fn acquire_shared(path: &Path, timeout: Duration) -> Result<(Self, LockState)> {
        Self::acquire_with(path, timeout, Access::AllUsers)
    }

    fn acquire_with(path: &Path, timeout: Duration, access: Access) -> Result<(Self, LockState)> {
        let file = open_lock_file(path, access)?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(INITIAL_POLL)
            .with_max_interval(MAX_POLL)
            .with_max_elapsed_time(Some(timeout))
            .build();

        let locked = backoff::retry(policy, || match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(()),
            Err(e) if is_contended(&e) => Err(backoff::Error::transient(e)),
            Err(e) => Err(backoff::Error::permanent(e)),
        });

        match locked {
            Ok(()) => Self::claim(file, path),
            Err(backoff::Error::Transient { .. }) => Err(Error::LockTimeout {
                path: path.to_path_buf(),
                timeout,
            }),
            Err(backoff::Error::Permanent(e)) => Err(Error::io(path, e)),
        }
    }

    /// Try to acquire the lock without waiting.
    ///
    /// Returns `Ok(None)` when another holder has it.
    pub fn try_acquire(path: &Path) -> Result<Option<(Self, LockState)>> {
        let file = open_lock_file(path, Access::CurrentUser)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Self::claim(file, path).map(Some),
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn claim(mut file: File, path: &Path) -> Result<(Self, LockState)> {
        let mut previous = String::new();
        file.read_to_string(&mut previous)
            .map_err(|e| Error::io(path, e))?;

        let state = match previous.trim() {
            "" => LockState::Fresh,
            owner => LockState::Abandoned {
                previous_owner: owner.to_string(),
            },
        };

        file.set_len(0).map_err(|e| Error::io(path, e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(path, e))?;
        writeln!(file, "pid={}", std::process::id()).map_err(|e| Error::io(path, e))?;
        file.flush().map_err(|e| Error::io(path, e))?;

        Ok((
            Self {
                file,
                path: path.to_path_buf(),
            },
            state,
        ))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Clear the owner record while still holding the lock.
        if let Err(e) = self.file.set_len(0) {
            tracing::warn!(path = %self.path.display(), "Failed to clear lock owner: {}", e);
        }
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), "Failed to release lock: {}", e);
        }
    }
}

fn open_lock_file(path: &Path, access: Access) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        match access {
            Access::CurrentUser => {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?
            }
            Access::AllUsers => create_shared_dir(parent)?,
        }
    }

    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    if access == Access::AllUsers {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SHARED_FILE_MODE);
    }
    let file = options.open(path).map_err(|e| Error::io(path, e))?;

    #[cfg(unix)]
    if access == Access::AllUsers {
        share_lock_file(&file, path);
    }
    Ok(file)
}

#[cfg(unix)]
fn create_shared_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    if dir.is_dir() {
        return Ok(());
    }
    fs::DirBuilder::new()
        .recursive(true)
        .mode(SHARED_DIR_MODE)
        .create(dir)
        .map_err(|e| Error::io(dir, e))?;

    // The umask strips the sticky and write bits from the requested mode.
    // Losing a creation race to another account makes this fail harmlessly.
    if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(SHARED_DIR_MODE)) {
        tracing::warn!(dir = %dir.display(), "Cannot open lock directory to all users: {}", e);
    }
    Ok(())
}

#[cfg(not(unix))]
fn create_shared_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Widen a lock file's mode past the umask. Only the creator can, and only
/// the creator needs to; later openers just see the mode already set.
#[cfg(unix)]
fn share_lock_file(file: &File, path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let current = match file.metadata() {
        Ok(metadata) => metadata.permissions().mode() & 0o777,
        Err(e) => {
            tracing::debug!(path = %path.display(), "Cannot inspect lock file mode: {}", e);
            return;
        }
    };
    if current == SHARED_FILE_MODE {
        return;
    }
    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(SHARED_FILE_MODE)) {
        tracing::debug!(path = %path.display(), "Cannot share lock file: {}", e);
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
