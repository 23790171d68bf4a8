//! Aggregate directory builder
//!
//! An aggregate is staged in `<output>.tmp` and published with one rename,
//! so a visible output directory is always complete. Staging directories
//! are never resumed: a leftover one belongs to a build that died and is
//! deleted before starting over.

use crate::lock::{self, DEFAULT_LOCK_TIMEOUT, LockProvider};
use crate::spec::{AggregateRequest, OperationKind};
use crate::{Error, Result};
use cbt_fs::{NormalizedPath, tree};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const STAGING_SUFFIX: &str = ".tmp";

/// What [`AggregateBuilder::build`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// This call merged and published the aggregate.
    Built,
    /// The aggregate already existed, possibly published by another process
    /// while this one waited for the lock.
    AlreadyPresent,
}

/// Builds aggregate directories under a cross-process lock
#[derive(Clone)]
pub struct AggregateBuilder {
    locks: Arc<dyn LockProvider>,
    lock_timeout: Duration,
}

impl AggregateBuilder {
    pub fn new(locks: Arc<dyn LockProvider>) -> Self {
        Self {
            locks,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Sibling directory an aggregate is staged in before publication.
    pub fn staging_path(output_path: &Path) -> PathBuf {
        NormalizedPath::new(output_path)
            .with_suffix(STAGING_SUFFIX)
            .to_native()
    }

    /// Make sure the aggregate for `request` exists at `output_path`.
    ///
    /// Existence is checked before taking the lock and again once it is
    /// held. Only the second check is authoritative.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceNotFound`] if a source folder is missing
    /// - [`Error::LockTimeout`] if another builder holds the lock too long
    /// - [`Error::BuildIncomplete`] if the staged tree cannot be published
    pub fn build(&self, request: &AggregateRequest, output_path: &Path) -> Result<BuildOutcome> {
        if output_path.is_dir() {
            tracing::debug!(output = %output_path.display(), "Aggregate already exists");
            return Ok(BuildOutcome::AlreadyPresent);
        }

        let key = output_path.to_string_lossy();
        lock::with_lock(self.locks.as_ref(), &key, self.lock_timeout, || {
            if output_path.is_dir() {
                tracing::debug!(
                    output = %output_path.display(),
                    "Aggregate was published while waiting for the lock"
                );
                return Ok(BuildOutcome::AlreadyPresent);
            }
            self.stage_and_publish(request, output_path)
        })
    }

    fn stage_and_publish(&self, request: &AggregateRequest, output_path: &Path) -> Result<BuildOutcome> {
        let staging = Self::staging_path(output_path);

        if tree::remove_dir_if_exists(&staging)? {
            tracing::warn!(staging = %staging.display(), "Removed stale staging directory");
        }
        fs::create_dir_all(&staging).map_err(|e| cbt_fs::Error::io(&staging, e))?;

        if let Err(e) = apply_operations(request, &staging) {
            discard_staging(&staging);
            return Err(e);
        }

        match fs::rename(&staging, output_path) {
            Ok(()) => {
                tracing::debug!(
                    name = request.name(),
                    output = %output_path.display(),
                    "Published staging directory"
                );
                Ok(BuildOutcome::Built)
            }
            Err(_) if output_path.is_dir() => {
                discard_staging(&staging);
                Ok(BuildOutcome::AlreadyPresent)
            }
            Err(source) => {
                discard_staging(&staging);
                Err(Error::BuildIncomplete {
                    staging,
                    output: output_path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Debug for AggregateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateBuilder")
            .field("lock_timeout", &self.lock_timeout)
            .finish_non_exhaustive()
    }
}

/// Apply the request's operations, in order, to `target`.
pub fn apply_operations(request: &AggregateRequest, target: &Path) -> Result<()> {
    for operation in request.operations() {
        let source = Path::new(&operation.source_path);
        let applied = match operation.kind {
            OperationKind::Add => tree::copy_tree(source, target),
            OperationKind::Remove => tree::remove_matching(source, target),
        };

        let files = applied.map_err(|e| match e {
            cbt_fs::Error::DirectoryNotFound { path } => Error::SourceNotFound { path },
            other => Error::Fs(other),
        })?;
        tracing::debug!(operation = %operation, files, "Applied package operation");
    }
    Ok(())
}

fn discard_staging(staging: &Path) {
    if let Err(e) = tree::remove_dir_if_exists(staging) {
        tracing::warn!(staging = %staging.display(), "Failed to clean up staging directory: {}", e);
    }
}
