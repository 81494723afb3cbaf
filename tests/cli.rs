// CLI surface tests: init, completions, and global flags.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod util;

#[test]
fn test_init_creates_config_and_respects_force() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    tmp.child("repodigest.toml")
        .assert(predicate::str::contains("max_files"));

    // Second run without --force refuses to clobber.
    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // --force overwrites.
    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("init")
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_config_file_feeds_index_defaults() {
    let tmp = util::make_fixture();
    // A partial config: unset fields keep their defaults, and the
    // configured artifact path stands in for a missing -o flag.
    tmp.child("repodigest.toml")
        .write_str(
            "ignore_patterns = [\"src/components/**\"]\n\n[index]\noutput_file = \"idx.json\"\n",
        )
        .expect("write config");

    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("--quiet")
        .arg("index")
        .assert()
        .success();

    let raw = std::fs::read_to_string(tmp.path().join("idx.json")).expect("artifact written");
    let v: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let paths: Vec<&str> = v["fileMetadata"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();

    assert!(!paths.iter().any(|p| p.starts_with("src/components/")));
    assert!(paths.contains(&"src/store.js"));
}

#[test]
fn test_explicit_output_flag_beats_config_path() {
    let tmp = util::make_fixture();
    tmp.child("repodigest.toml")
        .write_str("[index]\noutput_file = \"from-config.json\"\n")
        .expect("write config");

    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("--quiet")
        .arg("index")
        .arg("-o")
        .arg("from-flag.json")
        .assert()
        .success();

    tmp.child("from-flag.json")
        .assert(predicate::str::contains("\"detectedStack\""));
    assert!(!tmp.path().join("from-config.json").exists());
}

#[test]
fn test_completions_emit_script() {
    Command::cargo_bin("rdg")
        .expect("bin")
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("rdg"));
}

#[test]
fn test_dry_run_does_not_index() {
    let tmp = util::make_fixture();

    Command::cargo_bin("rdg")
        .expect("bin")
        .current_dir(tmp.path())
        .arg("--dry-run")
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));
}
