// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

const APP_TS: &str = r#"export const VERSION = "1.0";

export class Cache {
  get(key) {
    return this.store[key];
  }
}

const clear = () => {};
"#;

fn reposcope(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("reposcope"));
    cmd.current_dir(dir).env("HOME", dir).env("NO_COLOR", "1");
    cmd
}

#[test]
fn constructs_json_lists_all_buckets_in_source_order() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("app.ts"), APP_TS).expect("write file");

    let output = reposcope(dir.path())
        .args(["--format", "json", "--compact", "constructs", "app.ts"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("valid json");

    assert_eq!(value["file"], "app.ts");
    assert_eq!(value["language"], "typescript");
    let listed: Vec<(String, String)> = value["constructs"]
        .as_array()
        .expect("constructs array")
        .iter()
        .map(|c| {
            (
                c["kind"].as_str().unwrap_or_default().to_string(),
                c["name"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    assert_eq!(
        listed,
        vec![
            ("variable".to_string(), "VERSION".to_string()),
            ("class".to_string(), "Cache".to_string()),
            ("function".to_string(), "get".to_string()),
            ("variable".to_string(), "clear".to_string()),
            ("function".to_string(), "anonymous".to_string()),
        ]
    );
}

#[test]
fn constructs_filter_keeps_one_bucket() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("app.ts"), APP_TS).expect("write file");

    reposcope(dir.path())
        .args(["c", "app.ts", "-k", "class"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 constructs in app.ts (typescript)"))
        .stdout(predicate::str::contains("  class    Cache  3-7"));
}

#[test]
fn constructs_missing_file_fails() {
    let dir = TempDir::new().expect("tempdir");

    reposcope(dir.path())
        .args(["constructs", "nope.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read nope.py"));
}

#[test]
fn completions_are_generated() {
    let dir = TempDir::new().expect("tempdir");

    reposcope(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reposcope"));
}
