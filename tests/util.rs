//! Shared test utilities for integration tests
//!
//! Provides common fixture creation helpers used across multiple
//! test files.

use assert_fs::prelude::*;

/// Build a small mixed-language repository that exercises stack
/// detection, classification, extraction, and special-file scanning
/// without depending on any external services.
pub fn make_fixture() -> assert_fs::TempDir {
    // Create an ephemeral temp directory that is auto-cleaned.
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    // Root manifest with a framework dependency and an engine pin.
    tmp.child("package.json")
        .write_str(
            r#"{
  "name": "demo-app",
  "version": "1.0.0",
  "description": "Fixture application",
  "engines": { "node": ">=18.0.0" },
  "dependencies": { "react": "^18.2.0" }
}"#,
        )
        .expect("write package.json");

    // A source file with a named export for extraction checks.
    tmp.child("src/store.js")
        .write_str("import { api } from 'axios';\n\nexport function createStore() {}\n")
        .expect("write store.js");

    // A second source directory so module grouping has a real bucket.
    tmp.child("src/components/Button.jsx")
        .write_str("export function Button() {}\n")
        .expect("write Button.jsx");
    tmp.child("src/components/Card.jsx")
        .write_str("export function Card() {}\n")
        .expect("write Card.jsx");

    // Root readme for the special-file scanner.
    tmp.child("README.md")
        .write_str("# Demo Project\n\nSome context here.\n")
        .expect("write README.md");

    tmp
}

/// Build a wide fixture (many files) to exercise the file cap.
pub fn make_wide_fixture(files: usize) -> assert_fs::TempDir {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    for i in 0..files {
        tmp.child(format!("src/unit_{i:04}.rs"))
            .write_str(&format!("pub fn f_{i}() {{}}\n"))
            .expect("write unit file");
    }

    tmp
}
