//! Aggregate builder behaviour against real directory trees

use cbt_aggregate::{
    AggregateBuilder, AggregateOutput, BuildOutcome, Error, LockGuard, LockProvider,
    MachineLockProvider, Result, parse,
};
use cbt_test_utils::PackageFixture;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn builder(fixture: &PackageFixture) -> AggregateBuilder {
    AggregateBuilder::new(Arc::new(MachineLockProvider::new(fixture.lock_dir())))
        .with_lock_timeout(Duration::from_secs(10))
}

fn standard_spec(fixture: &PackageFixture) -> String {
    let [pkg, pkg2, pkg3] = fixture.standard_packages();
    format!("foo={}|{}|!{}", pkg.display(), pkg2.display(), pkg3.display())
}

#[test]
fn add_and_remove_compose_in_order() {
    let fixture = PackageFixture::new();
    let request = &parse(&standard_spec(&fixture))[0];
    let output = AggregateOutput::for_request(&fixture.destination(), request);
    fs::create_dir_all(fixture.destination()).unwrap();

    let outcome = builder(&fixture).build(request, &output.output_path).unwrap();

    assert_eq!(outcome, BuildOutcome::Built);
    assert_eq!(
        PackageFixture::files_under(&output.output_path),
        vec!["cammel.txt", "cow.txt", "friend/bat.txt", "sour/bat.txt"]
    );
    assert_eq!(
        PackageFixture::read(&output.output_path.join("cow.txt")),
        "pkg2 cow"
    );
    assert!(fixture.staging_leftovers().is_empty());
}

#[test]
fn later_add_reintroduces_removed_file() {
    let fixture = PackageFixture::new();
    let [pkg, _, pkg3] = fixture.standard_packages();
    let spec = format!("foo={}|!{}|{}", pkg.display(), pkg3.display(), pkg3.display());
    let request = &parse(&spec)[0];
    let output = fixture.destination().join("foo");
    fs::create_dir_all(fixture.destination()).unwrap();

    builder(&fixture).build(request, &output).unwrap();

    assert_eq!(PackageFixture::read(&output.join("fool.txt")), "pkg3 fool");
    assert!(output.join("sour/bats.txt").is_file());
}

#[test]
fn second_build_is_a_no_op() {
    let fixture = PackageFixture::new();
    let request = &parse(&standard_spec(&fixture))[0];
    let output = fixture.destination().join("foo.fixed");
    fs::create_dir_all(fixture.destination()).unwrap();
    let builder = builder(&fixture);

    assert_eq!(builder.build(request, &output).unwrap(), BuildOutcome::Built);

    // With a source gone, only a skipped merge can still succeed
    fs::remove_dir_all(fixture.root().join("packages/pkg2")).unwrap();
    assert_eq!(
        builder.build(request, &output).unwrap(),
        BuildOutcome::AlreadyPresent
    );
    assert!(output.join("cammel.txt").is_file());
    assert!(fixture.staging_leftovers().is_empty());
}

#[test]
fn stale_staging_directory_is_purged() {
    let fixture = PackageFixture::new();
    let request = &parse(&standard_spec(&fixture))[0];
    let output = fixture.destination().join("foo.fixed");
    let staging = AggregateBuilder::staging_path(&output);
    fs::create_dir_all(staging.join("half")).unwrap();
    fs::write(staging.join("half/stale.txt"), "stale").unwrap();

    let outcome = builder(&fixture).build(request, &output).unwrap();

    assert_eq!(outcome, BuildOutcome::Built);
    assert!(!output.join("half").exists());
    assert!(!staging.exists());
}

#[test]
fn staging_path_is_sibling_with_tmp_suffix() {
    let output = Path::new("/cache/foo.0123456789abcdef");
    assert_eq!(
        AggregateBuilder::staging_path(output),
        Path::new("/cache/foo.0123456789abcdef.tmp")
    );
}

#[test]
fn missing_source_fails_without_publishing() {
    let fixture = PackageFixture::new();
    let pkg = fixture.package("pkg", &[("a.txt", "a")]);
    let missing = fixture.root().join("packages/missing");
    let spec = format!("foo={}|{}", pkg.display(), missing.display());
    let request = &parse(&spec)[0];
    let output = fixture.destination().join("foo.fixed");
    fs::create_dir_all(fixture.destination()).unwrap();

    let result = builder(&fixture).build(request, &output);

    match result {
        Err(Error::SourceNotFound { path }) => assert_eq!(path, missing),
        other => panic!("expected SourceNotFound, got {:?}", other),
    }
    assert!(!output.exists());
    assert!(fixture.staging_leftovers().is_empty());
}

#[test]
fn missing_remove_source_fails() {
    let fixture = PackageFixture::new();
    let pkg = fixture.package("pkg", &[("a.txt", "a")]);
    let spec = format!("foo={}|!{}", pkg.display(), fixture.root().join("nope").display());
    let request = &parse(&spec)[0];
    fs::create_dir_all(fixture.destination()).unwrap();

    let result = builder(&fixture).build(request, &fixture.destination().join("foo.x"));

    assert!(matches!(result, Err(Error::SourceNotFound { .. })));
}

#[test]
fn lock_timeout_is_reported() {
    let fixture = PackageFixture::new();
    let request = &parse(&standard_spec(&fixture))[0];
    let output = fixture.destination().join("foo.fixed");
    fs::create_dir_all(fixture.destination()).unwrap();

    let provider = MachineLockProvider::new(fixture.lock_dir());
    let _held = provider
        .acquire(&output.to_string_lossy(), Duration::from_secs(1))
        .unwrap();

    let result = AggregateBuilder::new(Arc::new(provider.clone()))
        .with_lock_timeout(Duration::from_millis(200))
        .build(request, &output);

    assert!(matches!(result, Err(Error::LockTimeout { .. })));
    assert!(!output.exists());
    assert!(fixture.staging_leftovers().is_empty());
}

/// Publishes the output while "waiting", like a competing process would.
struct CompetingPublisher {
    output: std::path::PathBuf,
    acquisitions: AtomicUsize,
}

impl LockProvider for CompetingPublisher {
    fn acquire(&self, key: &str, _timeout: Duration) -> Result<LockGuard> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        fs::create_dir_all(self.output.join("from-other-process")).unwrap();
        Ok(LockGuard::new(key, ()))
    }
}

#[test]
fn existence_is_rechecked_under_the_lock() {
    let fixture = PackageFixture::new();
    let request = &parse(&standard_spec(&fixture))[0];
    let output = fixture.destination().join("foo.fixed");
    let provider = Arc::new(CompetingPublisher {
        output: output.clone(),
        acquisitions: AtomicUsize::new(0),
    });

    let outcome = AggregateBuilder::new(provider.clone())
        .build(request, &output)
        .unwrap();

    assert_eq!(outcome, BuildOutcome::AlreadyPresent);
    assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 1);
    assert!(PackageFixture::files_under(&output).is_empty());
    assert!(fixture.staging_leftovers().is_empty());
}

#[test]
fn existing_output_skips_locking_entirely() {
    let fixture = PackageFixture::new();
    let request = &parse(&standard_spec(&fixture))[0];
    let output = fixture.destination().join("foo.fixed");
    fs::create_dir_all(&output).unwrap();
    let provider = Arc::new(CompetingPublisher {
        output: output.clone(),
        acquisitions: AtomicUsize::new(0),
    });

    let outcome = AggregateBuilder::new(provider.clone())
        .build(request, &output)
        .unwrap();

    assert_eq!(outcome, BuildOutcome::AlreadyPresent);
    assert_eq!(provider.acquisitions.load(Ordering::SeqCst), 0);
}
