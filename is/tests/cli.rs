//! Smoke tests for the `is` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(temp: &TempDir) -> std::path::PathBuf {
    let ideas_path = temp.path().join("ideas.json");
    let config_path = temp.path().join("config.yml");
    std::fs::write(&config_path, format!("ideas_path: {}\n", ideas_path.display())).unwrap();
    config_path
}

#[test]
fn test_list_empty_store() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);

    Command::cargo_bin("is")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No ideas found"));
}

#[test]
fn test_path_points_at_configured_file() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);

    Command::cargo_bin("is")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ideas.json"));
}

#[test]
fn test_show_unknown_id_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp);

    Command::cargo_bin("is")
        .unwrap()
        .args(["--config", config.to_str().unwrap(), "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Idea not found"));
}
