//! Writing property files to disk

use cbt_msbuild::{PropertySet, PropertySink, PropsFile};
use std::fs;
use tempfile::TempDir;

#[test]
fn props_file_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("obj/aggregates.props");
    let properties = PropertySet::from_pairs([("Tools", "/cache/tools.0123456789abcdef")]).unwrap();

    PropsFile::new(path.as_path()).write(&properties).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("<Tools>/cache/tools.0123456789abcdef</Tools>"));
}

#[test]
fn props_file_is_replaced_wholesale() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.props");
    let file = PropsFile::new(path.as_path());

    file.write(&PropertySet::from_pairs([("Old", "1")]).unwrap())
        .unwrap();
    file.write(&PropertySet::from_pairs([("New", "2")]).unwrap())
        .unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(!written.contains("<Old>"));
    assert!(written.contains("<New>2</New>"));
}

#[test]
fn empty_set_still_writes_a_project() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.props");

    PropsFile::new(path.as_path()).write(&PropertySet::new()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("<PropertyGroup>"));
    assert!(written.trim_end().ends_with("</Project>"));
}
