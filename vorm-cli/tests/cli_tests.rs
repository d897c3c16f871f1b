//! Integration tests for the vorm CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the vorm binary, isolated from the caller's environment
#[allow(deprecated)]
fn vorm_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vorm").unwrap();
    cmd.current_dir(dir)
        .env_remove("VORM_CONFIG")
        .env_remove("VORM_SCHEMA_DIR")
        .env_remove("VORM_MODELS_DIR")
        .env_remove("VORM_LOG");
    cmd
}

fn init_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    vorm_cmd(dir.path()).arg("init").assert().success();
    dir
}

fn migration_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.join("schema/migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".json"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    vorm_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("vorm CLI"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    vorm_cmd(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_migrate_help() {
    let dir = TempDir::new().unwrap();
    vorm_cmd(dir.path())
        .args(["migrate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("rebuild-history"));
}

#[test]
fn test_init_creates_project() {
    let dir = init_project();
    assert!(dir.path().join("vorm.toml").exists());
    assert!(dir.path().join("models/rule.vorm").exists());
    assert!(dir.path().join("schema/migrations").is_dir());
}

#[test]
fn test_init_twice_warns() {
    let dir = init_project();
    vorm_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn test_generate_then_no_changes() {
    let dir = init_project();

    vorm_cmd(dir.path())
        .args(["migrate", "generate", "initial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated migration"))
        .stdout(predicate::str::contains("create collection rules"));

    let files = migration_files(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("_initial.json"));
    assert!(dir.path().join("schema/history/Rule.json").exists());

    vorm_cmd(dir.path())
        .args(["migrate", "generate", "again"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes detected"));
    assert_eq!(migration_files(dir.path()).len(), 1);
}

#[test]
fn test_diff_writes_nothing() {
    let dir = init_project();

    vorm_cmd(dir.path())
        .args(["migrate", "diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule (rules)"))
        .stdout(predicate::str::contains("embedding"));

    assert!(migration_files(dir.path()).is_empty());
    assert!(!dir.path().join("schema/history/Rule.json").exists());
}

#[test]
fn test_run_requires_bookkeeping_collection() {
    let dir = init_project();
    vorm_cmd(dir.path())
        .args(["migrate", "generate", "initial"])
        .assert()
        .success();

    vorm_cmd(dir.path())
        .args(["migrate", "run"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("vorm migrate init"));
}

#[test]
fn test_full_cycle() {
    let dir = init_project();
    vorm_cmd(dir.path())
        .args(["migrate", "generate", "initial"])
        .assert()
        .success();

    vorm_cmd(dir.path())
        .args(["migrate", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created collection migration_history"));

    vorm_cmd(dir.path())
        .args(["migrate", "run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pending migrations"));

    vorm_cmd(dir.path())
        .args(["migrate", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 applied"));

    let catalog = fs::read_to_string(dir.path().join("schema/catalog.json")).unwrap();
    assert!(catalog.contains("rules"));

    vorm_cmd(dir.path())
        .args(["migrate", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending migrations"));

    let output = vorm_cmd(dir.path())
        .args(["migrate", "status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["applied"].as_array().unwrap().len(), 1);
    assert!(status["pending"].as_array().unwrap().is_empty());

    vorm_cmd(dir.path())
        .args(["migrate", "rollback", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled back"));

    vorm_cmd(dir.path())
        .args(["migrate", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 applied, 1 pending"));
}

#[test]
fn test_added_field_generates_second_migration() {
    let dir = init_project();
    vorm_cmd(dir.path())
        .args(["migrate", "generate", "initial"])
        .assert()
        .success();

    let model = dir.path().join("models/rule.vorm");
    let content = fs::read_to_string(&model).unwrap();
    fs::write(
        &model,
        content.replace(
            "embedding   FloatVector(1536)",
            "embedding   FloatVector(1536)\n    priority    Int64",
        ),
    )
    .unwrap();

    vorm_cmd(dir.path())
        .args(["migrate", "generate", "add_priority"])
        .assert()
        .success()
        .stdout(predicate::str::contains("add to rules"));

    assert_eq!(migration_files(dir.path()).len(), 2);
}

#[test]
fn test_rebuild_history() {
    let dir = init_project();
    vorm_cmd(dir.path())
        .args(["migrate", "generate", "initial"])
        .assert()
        .success();
    fs::remove_file(dir.path().join("schema/history/Rule.json")).unwrap();

    vorm_cmd(dir.path())
        .args(["migrate", "rebuild-history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule (rules) version 1"));
    assert!(dir.path().join("schema/history/Rule.json").exists());
}

#[test]
fn test_unparsable_declaration_is_skipped() {
    let dir = init_project();
    fs::write(
        dir.path().join("models/rule.vorm"),
        "entity Broken { @@collection(\"broken\") id Strng @primary }",
    )
    .unwrap();

    vorm_cmd(dir.path())
        .args(["migrate", "generate", "broken"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes detected"));
    assert!(migration_files(dir.path()).is_empty());
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    vorm_cmd(dir.path())
        .args(["--config", "missing.toml", "migrate", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
