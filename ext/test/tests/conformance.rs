//! Conformance tests that run YAML fixtures against ruta
//!
//! Run with: cargo test -p ruta-test --test conformance --features ruta-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use ruta_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the fixtures directory at the workspace root
fn fixtures_dir() -> PathBuf {
    // The manifest dir is ext/test
    let manifest_dir = env!("CARGO_MANIFEST_DIR");

    let root = Path::new(manifest_dir)
        .parent() // ext
        .and_then(|p| p.parent()) // workspace root
        .expect("Could not find workspace root");

    root.join("fixtures")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    if !dir.exists() {
        panic!("Fixtures directory does not exist: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            path.extension()
                .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_patterns() {
    run_fixtures_in_dir(&fixtures_dir().join("01_patterns"));
}

#[test]
fn test_dispatch() {
    run_fixtures_in_dir(&fixtures_dir().join("02_dispatch"));
}

#[test]
fn test_registration() {
    run_fixtures_in_dir(&fixtures_dir().join("03_registration"));
}

#[test]
fn test_normalization() {
    run_fixtures_in_dir(&fixtures_dir().join("04_normalization"));
}
