//! Integration tests for the `ghpub` binary.
//!
//! Only paths that never reach the network are exercised here: argument
//! handling, configuration, file collection, and credential resolution.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

/// A `ghpub` invocation isolated from the user's config and token.
fn ghpub(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ghpub").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("xdg"))
        .env_remove("GHPUBLISH_CONFIG")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// A project with a backend, a frontend, and some noise to skip.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("backend/app")).unwrap();
    fs::create_dir_all(root.join("backend/__pycache__")).unwrap();
    fs::create_dir_all(root.join("frontend/src")).unwrap();
    fs::create_dir_all(root.join("frontend/node_modules/react")).unwrap();
    fs::write(root.join("backend/app/main.py"), "print('hi')\n").unwrap();
    fs::write(root.join("backend/__pycache__/main.cpython-311.pyc"), "x").unwrap();
    fs::write(root.join("frontend/src/App.tsx"), "export {}\n").unwrap();
    fs::write(root.join("frontend/node_modules/react/index.js"), "x").unwrap();
    fs::write(root.join("notes.txt"), "not collected").unwrap();
    dir
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    ghpub(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("repo"))
        .stdout(predicate::str::contains("rate-limit"));
}

#[test]
fn collect_lists_project_files() {
    let home = TempDir::new().unwrap();
    let project = project();

    ghpub(home.path())
        .arg("collect")
        .arg("--dir")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("backend/app/main.py"))
        .stdout(predicate::str::contains("frontend/src/App.tsx"))
        .stdout(predicate::str::contains("README.md"))
        .stdout(predicate::str::contains(".gitignore"))
        .stdout(predicate::str::contains("node_modules").not())
        .stdout(predicate::str::contains("__pycache__").not())
        .stdout(predicate::str::contains("notes.txt").not());
}

#[test]
fn collect_json_output() {
    let home = TempDir::new().unwrap();
    let project = project();

    let output = ghpub(home.path())
        .args(["collect", "--json", "--dir"])
        .arg(project.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec![
            "backend/app/main.py",
            "frontend/src/App.tsx",
            "README.md",
            ".gitignore"
        ]
    );
}

#[test]
fn collect_honors_config_file() {
    let home = TempDir::new().unwrap();
    let project = project();
    let config = home.path().join("ghpub.toml");
    fs::write(
        &config,
        r#"
        [collect]
        include_dirs = ["backend"]
        synthesize = false
        "#,
    )
    .unwrap();

    ghpub(home.path())
        .arg("--config")
        .arg(&config)
        .arg("collect")
        .arg("--dir")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("backend/app/main.py"))
        .stdout(predicate::str::contains("frontend").not())
        .stdout(predicate::str::contains("README.md").not());
}

#[test]
fn collect_missing_root_fails() {
    let home = TempDir::new().unwrap();
    ghpub(home.path())
        .args(["collect", "--dir"])
        .arg(home.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn missing_token_is_authentication_failure() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("ghpub.toml");
    fs::write(&config, "token_env = \"GHPUB_TEST_TOKEN_UNSET\"\n").unwrap();

    ghpub(home.path())
        .env_remove("GHPUB_TEST_TOKEN_UNSET")
        .arg("--config")
        .arg(&config)
        .arg("rate-limit")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("GHPUB_TEST_TOKEN_UNSET"));
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("ghpub.toml");
    fs::write(&config, "blob_concurrency = 0\n").unwrap();

    ghpub(home.path())
        .arg("--config")
        .arg(&config)
        .arg("collect")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("blob_concurrency"));
}

#[test]
fn malformed_repository_argument_is_rejected() {
    let home = TempDir::new().unwrap();
    ghpub(home.path())
        .args(["repo", "get", "not-a-repo"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("owner/repo"));
}

#[test]
fn delete_requires_confirmation() {
    let home = TempDir::new().unwrap();
    ghpub(home.path())
        .args(["repo", "delete", "octocat/demo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn unknown_command_is_usage_error() {
    let home = TempDir::new().unwrap();
    ghpub(home.path())
        .arg("publish-everything")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
