//! Error types for cbt-aggregate

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cbt-aggregate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building aggregates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An add or remove source directory does not exist
    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The cross-process lock was not acquired in time
    #[error("Timed out after {timeout:?} waiting for lock on {key}")]
    LockTimeout { key: String, timeout: Duration },

    /// The staging directory could not be promoted to the output path
    #[error("Could not publish {staging} as {output}: {source}")]
    BuildIncomplete {
        staging: PathBuf,
        output: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more aggregates in a batch failed
    #[error("{failed} of {total} aggregate(s) could not be created")]
    BatchFailed { failed: usize, total: usize },

    /// Filesystem error from cbt-fs
    #[error(transparent)]
    Fs(#[from] cbt_fs::Error),
}
