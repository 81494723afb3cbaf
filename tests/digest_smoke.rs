// Integration tests for the `digest` command: asserts the rendered
// text contains its bounded sections and stays deterministic.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod util;

fn run_digest(dir: &std::path::Path, args: &[&str]) -> String {
    let mut cmd = Command::cargo_bin("rdg").expect("bin");
    let assert = cmd
        .current_dir(dir)
        .arg("--quiet")
        .arg("digest")
        .args(args)
        .assert()
        .success();
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8")
}

#[test]
fn test_digest_renders_expected_sections() {
    let tmp = util::make_fixture();
    let text = run_digest(tmp.path(), &[]);

    assert!(text.starts_with("# Repository digest"));
    assert!(text.contains("## Technology stack"));
    assert!(text.contains("Node.js"));
    assert!(text.contains("## Workspace packages"));
    assert!(text.contains("demo-app"));
    // Readme content is inlined verbatim.
    assert!(text.contains("## Project documentation & rules"));
    assert!(text.contains("Some context here."));
    assert!(text.contains("## Modules"));
    // Footer with totals and timestamp.
    assert!(text.contains("Indexed "));
    assert!(text.contains(" files at "));
}

#[test]
fn test_digest_no_special_files_flag() {
    let tmp = util::make_fixture();
    let text = run_digest(tmp.path(), &["--no-special-files"]);

    assert!(!text.contains("Some context here."));
    // The rest of the digest is unaffected.
    assert!(text.contains("## Technology stack"));
}

#[test]
fn test_digest_components_module_purpose() {
    let tmp = util::make_fixture();
    let text = run_digest(tmp.path(), &[]);

    // The components directory gets its table-driven purpose label.
    assert!(text.contains("src/components — UI components"));
}

#[test]
fn test_digest_deterministic_modulo_timestamp() {
    let tmp = util::make_fixture();

    let strip_footer = |text: String| {
        text.lines()
            .filter(|l| !l.starts_with("Indexed "))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let first = strip_footer(run_digest(tmp.path(), &[]));
    let second = strip_footer(run_digest(tmp.path(), &[]));
    assert_eq!(first, second);
}

#[test]
fn test_digest_writes_output_file() {
    let tmp = util::make_fixture();

    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("--quiet")
        .arg("digest")
        .arg("-o")
        .arg("digest.txt")
        .assert()
        .success();

    tmp.child("digest.txt")
        .assert(predicate::str::contains("# Repository digest"));
}
