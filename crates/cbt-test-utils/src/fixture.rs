//! [`PackageFixture`]: package folders and an aggregate root in a temp dir.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary workspace holding package folders under `packages/` and an
/// aggregate destination under `aggregates/`.
///
/// # Example
///
/// ```rust
/// use cbt_test_utils::PackageFixture;
///
/// let fixture = PackageFixture::new();
/// let pkg = fixture.package("pkg", &[("lib/a.dll", "a")]);
/// assert_eq!(PackageFixture::files_under(&pkg), vec!["lib/a.dll"]);
/// ```
pub struct PackageFixture {
    temp_dir: TempDir,
}

impl Default for PackageFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Destination root for aggregates (not created).
    pub fn destination(&self) -> PathBuf {
        self.root().join("aggregates")
    }

    /// Directory used for lock files.
    pub fn lock_dir(&self) -> PathBuf {
        self.root().join("locks")
    }

    /// Create `packages/<name>` containing `files` (relative path, content).
    pub fn package(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.root().join("packages").join(name);
        fs::create_dir_all(&dir).unwrap();
        for (relative, content) in files {
            let path = dir.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    /// The three packages used by the add/remove scenarios:
    ///
    /// - `pkg`  = {fool.txt, friend/bat.txt, cow.txt}
    /// - `pkg2` = {cammel.txt, sour/bat.txt, cow.txt}
    /// - `pkg3` = {fool.txt, sour/bats.txt}
    pub fn standard_packages(&self) -> [PathBuf; 3] {
        [
            self.package(
                "pkg",
                &[
                    ("fool.txt", "pkg fool"),
                    ("friend/bat.txt", "pkg bat"),
                    ("cow.txt", "pkg cow"),
                ],
            ),
            self.package(
                "pkg2",
                &[
                    ("cammel.txt", "pkg2 cammel"),
                    ("sour/bat.txt", "pkg2 bat"),
                    ("cow.txt", "pkg2 cow"),
                ],
            ),
            self.package(
                "pkg3",
                &[("fool.txt", "pkg3 fool"), ("sour/bats.txt", "pkg3 bats")],
            ),
        ]
    }

    /// Sorted, `/`-separated relative paths of every file under `dir`.
    pub fn files_under(dir: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    /// Entries of the destination root whose names end in `.tmp`.
    pub fn staging_leftovers(&self) -> Vec<String> {
        match fs::read_dir(self.destination()) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.ends_with(".tmp"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Read a file as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }
}
