//! Error types for cbt-msbuild

use std::path::PathBuf;

/// Result type for cbt-msbuild operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cbt-msbuild operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not a valid MSBuild property name
    #[error("Invalid property name '{name}'")]
    InvalidPropertyName { name: String },

    /// A lock file could not be parsed
    #[error("Failed to parse lock file {path}: {message}")]
    LockFileParse { path: PathBuf, message: String },

    /// No provider found a lock file for the project
    #[error("No package lock file found in {project_dir}")]
    NoLockFile { project_dir: PathBuf },

    /// Filesystem error from cbt-fs
    #[error(transparent)]
    Fs(#[from] cbt_fs::Error),
}
