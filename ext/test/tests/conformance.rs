//! Conformance tests that run YAML fixtures against reqsan
//!
//! Run with: cargo test -p reqsan-test --test conformance --features reqsan-test/fixtures

#![cfg(feature = "fixtures")]

use reqsan_test::load_fixtures;
use std::path::{Path, PathBuf};

/// The `fixtures/` directory at the workspace root
fn fixtures_dir() -> PathBuf {
    // ext/test -> ext -> workspace root
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn run_fixtures_in_dir(name: &str) {
    let dir = fixtures_dir().join(name);
    let fixtures = load_fixtures(&dir).unwrap_or_else(|e| panic!("{e}"));
    assert!(!fixtures.is_empty(), "no fixtures in {}", dir.display());

    for fixture in &fixtures {
        println!("  Fixture: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn conformance_parsing() {
    run_fixtures_in_dir("01_parsing");
}

#[test]
fn conformance_conditions() {
    run_fixtures_in_dir("02_conditions");
}

#[test]
fn conformance_semantics() {
    run_fixtures_in_dir("03_semantics");
}

#[test]
fn conformance_layering() {
    run_fixtures_in_dir("04_layering");
}
