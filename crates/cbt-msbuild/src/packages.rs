//! Resolved packages from NuGet lock files
//!
//! Providers are tried in order and the first one that finds its lock file
//! in the project directory wins.

use crate::props::PropertySet;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Map;
use std::fs;
use std::path::{Path, PathBuf};

const PATH_PROPERTY_PREFIX: &str = "NuGetPath_";
const VERSION_PROPERTY_PREFIX: &str = "NuGetVersion_";
const PACKAGE_LIBRARY_TYPE: &str = "package";

/// A package the restore resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub id: String,
    pub version: String,
    pub install_path: PathBuf,
}

/// Reads resolved packages from one lock-file format
pub trait PackageProvider {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// The lock file this provider understands, if the project has one.
    fn lock_file(&self, project_dir: &Path) -> Option<PathBuf>;

    fn read(&self, lock_file: &Path) -> Result<Vec<PackageReference>>;
}

/// Ordered list of providers
pub struct ProviderChain {
    providers: Vec<Box<dyn PackageProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn PackageProvider>>) -> Self {
        Self { providers }
    }

    /// Assets files first, then legacy lock files resolved against
    /// `packages_root`.
    pub fn with_builtins(packages_root: PathBuf) -> Self {
        Self::new(vec![
            Box::new(AssetsFileProvider),
            Box::new(LockFileProvider::new(packages_root)),
        ])
    }

    /// Packages of the project in `project_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLockFile`] when no provider finds a lock file.
    pub fn resolve(&self, project_dir: &Path) -> Result<Vec<PackageReference>> {
        for provider in &self.providers {
            if let Some(lock_file) = provider.lock_file(project_dir) {
                tracing::debug!(
                    provider = provider.name(),
                    lock_file = %lock_file.display(),
                    "Reading packages"
                );
                return provider.read(&lock_file);
            }
        }
        Err(Error::NoLockFile {
            project_dir: project_dir.to_path_buf(),
        })
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

/// `obj/project.assets.json`
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetsFileProvider;

impl PackageProvider for AssetsFileProvider {
    fn name(&self) -> &'static str {
        "project.assets.json"
    }

    fn lock_file(&self, project_dir: &Path) -> Option<PathBuf> {
        Some(project_dir.join("obj").join("project.assets.json")).filter(|p| p.is_file())
    }

    fn read(&self, lock_file: &Path) -> Result<Vec<PackageReference>> {
        let document: LockDocument = load(lock_file)?;
        let Some(folder) = document.package_folders.keys().next() else {
            return Err(Error::LockFileParse {
                path: lock_file.to_path_buf(),
                message: "no packageFolders".to_string(),
            });
        };
        let folder = PathBuf::from(folder);
        Ok(document.packages(&folder))
    }
}

/// `project.lock.json`, resolved against a packages root
#[derive(Debug, Clone)]
pub struct LockFileProvider {
    packages_root: PathBuf,
}

impl LockFileProvider {
    pub fn new(packages_root: PathBuf) -> Self {
        Self { packages_root }
    }

    /// `~/.nuget/packages`, the NuGet global packages folder.
    pub fn default_packages_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".nuget").join("packages"))
    }
}

impl PackageProvider for LockFileProvider {
    fn name(&self) -> &'static str {
        "project.lock.json"
    }

    fn lock_file(&self, project_dir: &Path) -> Option<PathBuf> {
        Some(project_dir.join("project.lock.json")).filter(|p| p.is_file())
    }

    fn read(&self, lock_file: &Path) -> Result<Vec<PackageReference>> {
        let document: LockDocument = load(lock_file)?;
        Ok(document.packages(&self.packages_root))
    }
}

#[derive(Debug, Deserialize)]
struct LockDocument {
    #[serde(default)]
    libraries: Map<String, serde_json::Value>,
    #[serde(default, rename = "packageFolders")]
    package_folders: Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Library {
    #[serde(rename = "type")]
    kind: Option<String>,
    path: Option<String>,
}

impl LockDocument {
    fn packages(&self, root: &Path) -> Vec<PackageReference> {
        self.libraries
            .iter()
            .filter_map(|(key, value)| {
                let (id, version) = key.split_once('/')?;
                let library = Library::deserialize(value).ok()?;
                if library.kind.as_deref().is_some_and(|k| k != PACKAGE_LIBRARY_TYPE) {
                    return None;
                }
                let relative = library
                    .path
                    .unwrap_or_else(|| format!("{}/{}", id, version));
                Some(PackageReference {
                    id: id.to_string(),
                    version: version.to_string(),
                    install_path: root.join(relative),
                })
            })
            .collect()
    }
}

fn load(path: &Path) -> Result<LockDocument> {
    let content = fs::read_to_string(path).map_err(|e| cbt_fs::Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::LockFileParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// `NuGetPath_<Id>` and `NuGetVersion_<Id>` for every package, with `.` in
/// ids replaced by `_`.
pub fn package_properties(packages: &[PackageReference]) -> Result<PropertySet> {
    let mut properties = PropertySet::new();
    for package in packages {
        let suffix = package.id.replace('.', "_");
        properties.insert(
            format!("{}{}", PATH_PROPERTY_PREFIX, suffix),
            package.install_path.display().to_string(),
        )?;
        properties.insert(
            format!("{}{}", VERSION_PROPERTY_PREFIX, suffix),
            package.version.clone(),
        )?;
    }
    Ok(properties)
}
