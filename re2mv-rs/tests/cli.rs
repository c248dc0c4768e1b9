//! CLI integration tests for the ani subcommands
//!
//! These tests run the built binary against small ANI files written to a
//! temporary directory.

use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Root with two children, the second of which has a child of its own
const SKELETON: &str = "4\n2 1 2\n1 3\n0\n0\n\
0 0 0\n0 1 0\n1 0 0\n0 0 2\n\
2\n\
0 0 0\n0 0 0\n0 0 90\n0 0 0\n45 0 0\n\
1 0 0\n0 0 0\n0 0 0\n0 0 0\n0 0 0\n";

fn re2mv() -> Command {
    Command::new(env!("CARGO_BIN_EXE_re2mv-rs"))
}

fn write_ani(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content).with_context(|| format!("Failed to write {name}"))?;
    Ok(path)
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).context("Failed to read export")?;
    serde_json::from_str(&text).context("Export is not valid JSON")
}

#[test]
fn test_cli_info_reports_counts() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "walk.ani", SKELETON)?;

    re2mv()
        .args(["ani", "info", "--detailed"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Parts: 4"))
        .stdout(predicate::str::contains("Frames: 2"))
        .stdout(predicate::str::contains("Rest Position"));

    Ok(())
}

#[test]
fn test_cli_tree_shows_nested_parts() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "walk.ani", SKELETON)?;

    re2mv()
        .args(["ani", "tree", "--no-color"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("walk.ani"))
        .stdout(predicate::str::contains("└── 🔗 part 3"));

    Ok(())
}

#[test]
fn test_cli_validate_accepts_well_formed_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "walk.ani", SKELETON)?;

    re2mv()
        .args(["ani", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    Ok(())
}

#[test]
fn test_cli_validate_reports_malformed_line() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "broken.ani", "2\n1 1\n0\n0 0 0\n0 zero 0\n")?;

    re2mv()
        .args(["ani", "validate"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 5"));

    Ok(())
}

#[test]
fn test_cli_ambiguous_parent_needs_flag() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "shared.ani", "3\n1 2\n1 2\n0\n0 0 0\n0 0 0\n0 0 0\n0\n")?;

    re2mv()
        .args(["ani", "validate"])
        .arg(&path)
        .assert()
        .failure();

    re2mv()
        .args(["ani", "validate", "--last-parent-wins"])
        .arg(&path)
        .assert()
        .success();

    Ok(())
}

#[test]
fn test_cli_import_writes_scene_export() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "walk.ani", SKELETON)?;
    let output = dir.path().join("scene.json");

    re2mv()
        .args(["ani", "import", "--objects", "6", "--output"])
        .arg(&output)
        .arg(&path)
        .assert()
        .success();

    let export = read_json(&output)?;
    let objects = export["objects"].as_array().context("objects array")?;
    assert_eq!(objects.len(), 6);
    assert_eq!(objects[0]["location_keys"].as_array().map(Vec::len), Some(2));
    assert_eq!(objects[3]["parent"], serde_json::json!(1));
    assert_eq!(objects[5]["rotation_keys"].as_array().map(Vec::len), Some(0));

    Ok(())
}

#[test]
fn test_cli_import_fails_for_short_scene() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_ani(&dir, "walk.ani", SKELETON)?;

    re2mv()
        .args(["ani", "import", "--objects", "2"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Index out of range"));

    Ok(())
}

#[test]
fn test_cli_normalize_rewrites_canonical_layout() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_ani(&dir, "messy.ani", "\u{feff}1\r\n0\r\n1.50 2 3\r\n0\r\n")?;
    let output = dir.path().join("clean.ani");

    re2mv()
        .args(["ani", "normalize"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let text = fs::read_to_string(&output)?;
    assert_eq!(text, "1\n0\n1.5 2 3\n0\n");

    Ok(())
}

#[test]
fn test_cli_missing_file_fails() {
    re2mv()
        .args(["ani", "info", "does-not-exist.ani"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse ANI file"));
}
