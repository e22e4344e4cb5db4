//! End-to-end CLI integration tests.
//!
//! None of these reach GitHub: they cover argument handling, manifest
//! loading, dry runs and the failures that happen before any request.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Creates a plugin directory with the given `package.json`.
fn setup_plugin(manifest: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    fs::write(temp_dir.path().join("package.json"), manifest).expect("failed to write manifest");
    temp_dir
}

/// A plugin with every field the registry entry uses.
fn full_plugin() -> TempDir {
    setup_plugin(
        r#"{
  "name": "sketch-my-plugin",
  "version": "1.4.0",
  "description": "Does useful things",
  "author": "Jane Doe <jane@example.com>",
  "repository": "https://github.com/jane/my-plugin.git",
  "skpm": { "title": "My Plugin", "main": "my-plugin.sketchplugin" }
}"#,
    )
}

/// Runs skpub in `dir` without any credential from the environment.
fn skpub(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("skpub").expect("skpub binary");
    cmd.current_dir(dir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();

    skpub(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("whoami"));
}

#[test]
fn test_missing_manifest_fails() {
    let temp_dir = TempDir::new().unwrap();

    skpub(temp_dir.path())
        .args(["register", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json"));
}

#[test]
fn test_missing_repository_fails() {
    let temp_dir = setup_plugin(r#"{ "name": "my-plugin", "version": "1.0.0" }"#);

    skpub(temp_dir.path())
        .args(["register", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repository"));
}

#[test]
fn test_register_dry_run_prints_entry() {
    let temp_dir = full_plugin();

    skpub(temp_dir.path())
        .args(["register", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("branch jane/my-plugin"))
        .stdout(predicate::str::contains(r#""title": "My Plugin""#))
        .stdout(predicate::str::contains(r#""name": "my-plugin""#))
        .stdout(predicate::str::contains(r#""owner": "jane""#))
        .stdout(predicate::str::contains(r#""author": "Jane Doe""#))
        .stdout(predicate::str::contains(
            "https://raw.githubusercontent.com/jane/my-plugin/master/.appcast.xml",
        ));
}

#[test]
fn test_register_dir_flag() {
    let temp_dir = full_plugin();
    let elsewhere = TempDir::new().unwrap();

    skpub(elsewhere.path())
        .arg("-C")
        .arg(temp_dir.path())
        .args(["register", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "my-plugin""#));
}

#[test]
fn test_publish_dry_run_shows_plan() {
    let temp_dir = full_plugin();

    skpub(temp_dir.path())
        .args(["publish", "--dry-run", "--registry"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jane/my-plugin"))
        .stdout(predicate::str::contains("v1.4.0"))
        .stdout(predicate::str::contains("my-plugin.sketchplugin.zip"))
        .stdout(predicate::str::contains("submit after publishing"));
}

#[test]
fn test_publish_dry_run_custom_tag() {
    let temp_dir = full_plugin();

    skpub(temp_dir.path())
        .args(["publish", "--dry-run", "--tag", "2024.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024.1"));
}

#[test]
fn test_publish_missing_asset_fails_before_login() {
    let temp_dir = full_plugin();

    skpub(temp_dir.path())
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("asset not found"));
}

#[test]
fn test_publish_without_token_fails() {
    let temp_dir = full_plugin();
    fs::write(temp_dir.path().join("my-plugin.sketchplugin.zip"), b"PK\x03\x04")
        .expect("failed to write asset");

    skpub(temp_dir.path())
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn test_register_without_token_fails() {
    let temp_dir = full_plugin();

    skpub(temp_dir.path())
        .arg("register")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn test_whoami_blank_token_fails() {
    let temp_dir = TempDir::new().unwrap();

    skpub(temp_dir.path())
        .args(["whoami", "--token", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = full_plugin();
    fs::write(temp_dir.path().join("skpub.toml"), "[registry\n").expect("failed to write config");

    skpub(temp_dir.path())
        .args(["register", "--token", "secret-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skpub.toml"))
        .stderr(predicate::str::contains("secret-token").not());
}

#[test]
fn test_config_found_in_parent_directory() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("skpub.toml"), "[registry\n").expect("failed to write config");

    let plugin_dir = root.path().join("plugins").join("my-plugin");
    fs::create_dir_all(&plugin_dir).expect("failed to create plugin dir");
    fs::write(
        plugin_dir.join("package.json"),
        r#"{ "name": "my-plugin", "repository": "jane/my-plugin" }"#,
    )
    .expect("failed to write manifest");

    skpub(&plugin_dir)
        .args(["register", "--token", "secret-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load skpub.toml"));
}
