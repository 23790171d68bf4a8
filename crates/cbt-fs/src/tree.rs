//! Directory tree merging
//!
//! Recursive copy (additive) and manifest-driven removal (subtractive) used
//! to compose package aggregates.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copy every file and directory under `source` into `target`,
/// overwriting files that already exist there.
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns [`Error::DirectoryNotFound`] if `source` is not a directory.
pub fn copy_tree(source: &Path, target: &Path) -> Result<usize> {
    ensure_dir(source)?;
    fs::create_dir_all(target).map_err(|e| Error::io(target, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let Some(destination) = rebase(source, entry.path(), target) else {
            continue;
        };

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|e| Error::io(&destination, e))?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::copy(entry.path(), &destination).map_err(|e| Error::io(&destination, e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove from `target` every file whose relative path also exists under
/// `manifest`.
///
/// `manifest` lists what to strip; it is never modified. Files that exist
/// only in `target` survive. Directories mirrored from `manifest` are
/// removed once they are empty.
///
/// Returns the number of files removed.
///
/// # Errors
///
/// Returns [`Error::DirectoryNotFound`] if `manifest` is not a directory.
pub fn remove_matching(manifest: &Path, target: &Path) -> Result<usize> {
    ensure_dir(manifest)?;

    let mut removed = 0;
    for entry in WalkDir::new(manifest)
        .min_depth(1)
        .follow_links(true)
        .contents_first(true)
    {
        let entry = entry.map_err(|e| walk_error(manifest, e))?;
        let Some(candidate) = rebase(manifest, entry.path(), target) else {
            continue;
        };

        if entry.file_type().is_dir() {
            if candidate.is_dir() && is_empty_dir(&candidate)? {
                fs::remove_dir(&candidate).map_err(|e| Error::io(&candidate, e))?;
            }
        } else if candidate.is_file() {
            fs::remove_file(&candidate).map_err(|e| Error::io(&candidate, e))?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Recursively delete `path` if it exists.
///
/// Returns whether anything was deleted.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Create `path` if needed and return its canonical form.
///
/// Uses `dunce` so Windows paths stay free of the `\\?\` prefix.
pub fn ensure_canonical_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    dunce::canonicalize(path).map_err(|e| Error::io(path, e))
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::DirectoryNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn rebase(root: &Path, entry: &Path, target: &Path) -> Option<PathBuf> {
    entry
        .strip_prefix(root)
        .ok()
        .map(|relative| target.join(relative))
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
    Ok(entries.next().is_none())
}

fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(root).to_path_buf();
    Error::io(path, std::io::Error::from(e))
}
