use assert_fs::prelude::*;
use cbt_fs::Error;
use cbt_fs::tree::{copy_tree, remove_matching};
use predicates::prelude::*;

#[test]
fn copy_then_remove_composes_trees() {
    let temp = assert_fs::TempDir::new().unwrap();
    let pkg = temp.child("pkg");
    pkg.child("fool.txt").write_str("pkg fool").unwrap();
    pkg.child("friend/bat.txt").write_str("pkg bat").unwrap();
    let pkg2 = temp.child("pkg2");
    pkg2.child("fool.txt").write_str("pkg2 fool").unwrap();
    pkg2.child("sour/bats.txt").write_str("pkg2 bats").unwrap();
    let out = temp.child("out");

    copy_tree(pkg.path(), out.path()).unwrap();
    copy_tree(pkg2.path(), out.path()).unwrap();
    out.child("fool.txt").assert("pkg2 fool");

    let removed = remove_matching(pkg2.path(), out.path()).unwrap();

    assert_eq!(removed, 2);
    out.child("fool.txt").assert(predicate::path::missing());
    out.child("sour").assert(predicate::path::missing());
    out.child("friend/bat.txt").assert("pkg bat");
    pkg2.child("sour/bats.txt").assert(predicate::path::exists());
}

#[test]
fn directories_with_unrelated_files_survive_removal() {
    let temp = assert_fs::TempDir::new().unwrap();
    let manifest = temp.child("manifest");
    manifest.child("lib/a.dll").touch().unwrap();
    let out = temp.child("out");
    out.child("lib/a.dll").touch().unwrap();
    out.child("lib/b.dll").touch().unwrap();

    remove_matching(manifest.path(), out.path()).unwrap();

    out.child("lib/a.dll").assert(predicate::path::missing());
    out.child("lib/b.dll").assert(predicate::path::is_file());
}

#[test]
fn copy_from_missing_source_fails() {
    let temp = assert_fs::TempDir::new().unwrap();

    let err = copy_tree(&temp.path().join("absent"), &temp.path().join("out")).unwrap_err();

    assert!(matches!(err, Error::DirectoryNotFound { .. }));
    temp.child("out").assert(predicate::path::missing());
}
