//! Lock-file discovery and parsing through the provider chain

use cbt_msbuild::{Error, PackageReference, ProviderChain, package_properties};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ASSETS_JSON: &str = r#"{
  "version": 2,
  "libraries": {
    "Newtonsoft.Json/9.0.1": {
      "sha512": "abc",
      "type": "package",
      "path": "newtonsoft.json/9.0.1"
    },
    "Helpers/1.0.0": {
      "type": "project",
      "path": "../Helpers/Helpers.csproj"
    }
  },
  "packageFolders": {
    "/restore/packages/": {},
    "/fallback/packages/": {}
  }
}"#;

const LOCK_JSON: &str = r#"{
  "locked": false,
  "version": 2,
  "libraries": {
    "xunit.core/2.1.0": { "sha512": "def", "type": "package" },
    "Moq/4.5.0": { "type": "package", "path": "Moq/4.5.0" }
  }
}"#;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn assets_file_uses_first_package_folder() {
    let project = TempDir::new().unwrap();
    write(&project.path().join("obj/project.assets.json"), ASSETS_JSON);

    let chain = ProviderChain::with_builtins("/unused".into());
    let packages = chain.resolve(project.path()).unwrap();

    assert_eq!(
        packages,
        vec![PackageReference {
            id: "Newtonsoft.Json".into(),
            version: "9.0.1".into(),
            install_path: Path::new("/restore/packages/").join("newtonsoft.json/9.0.1"),
        }]
    );
}

#[test]
fn assets_file_wins_over_lock_file() {
    let project = TempDir::new().unwrap();
    write(&project.path().join("obj/project.assets.json"), ASSETS_JSON);
    write(&project.path().join("project.lock.json"), LOCK_JSON);

    let chain = ProviderChain::with_builtins("/nuget".into());
    let packages = chain.resolve(project.path()).unwrap();

    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].id, "Newtonsoft.Json");
}

#[test]
fn lock_file_resolves_against_packages_root() {
    let project = TempDir::new().unwrap();
    write(&project.path().join("project.lock.json"), LOCK_JSON);

    let chain = ProviderChain::with_builtins("/nuget".into());
    let packages = chain.resolve(project.path()).unwrap();

    assert_eq!(
        packages
            .iter()
            .map(|p| (p.id.as_str(), p.install_path.clone()))
            .collect::<Vec<_>>(),
        vec![
            ("xunit.core", Path::new("/nuget").join("xunit.core/2.1.0")),
            ("Moq", Path::new("/nuget").join("Moq/4.5.0")),
        ]
    );
}

#[test]
fn missing_lock_file_is_reported() {
    let project = TempDir::new().unwrap();

    let err = ProviderChain::with_builtins("/nuget".into())
        .resolve(project.path())
        .unwrap_err();

    assert!(matches!(err, Error::NoLockFile { .. }));
}

#[test]
fn malformed_lock_file_is_a_parse_error() {
    let project = TempDir::new().unwrap();
    write(&project.path().join("project.lock.json"), "{ not json");

    let err = ProviderChain::with_builtins("/nuget".into())
        .resolve(project.path())
        .unwrap_err();

    assert!(matches!(err, Error::LockFileParse { .. }));
}

#[test]
fn resolved_packages_become_properties() {
    let project = TempDir::new().unwrap();
    write(&project.path().join("project.lock.json"), LOCK_JSON);

    let packages = ProviderChain::with_builtins("/nuget".into())
        .resolve(project.path())
        .unwrap();
    let properties = package_properties(&packages).unwrap();

    assert_eq!(properties.len(), 4);
    assert_eq!(properties.get("NuGetVersion_xunit_core"), Some("2.1.0"));
    assert_eq!(properties.get("NuGetVersion_Moq"), Some("4.5.0"));
}
