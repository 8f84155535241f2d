//! Integration tests for the CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo_content() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../content")
}

fn ic() -> Command {
    Command::cargo_bin("ic").unwrap()
}

/// `ic` with `--dir` pointing at the demo pack.
fn ic_demo(args: &[&str]) -> Command {
    let mut cmd = ic();
    cmd.args(args).arg("--dir").arg(demo_content());
    cmd
}

fn begin_session(save: &Path) {
    ic_demo(&["begin", "cottage_home", "--seed", "7"])
        .arg("--save")
        .arg(save)
        .assert()
        .success()
        .stdout(predicate::str::contains("Started"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_demo_pack() {
    ic_demo(&["check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"))
        .stdout(predicate::str::contains("place"));
}

#[test]
fn check_missing_dir_fails() {
    let dir = TempDir::new().unwrap();
    ic().args(["check", "--dir"])
        .arg(dir.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// list / show
// ---------------------------------------------------------------------------

#[test]
fn list_places() {
    ic_demo(&["list", "places"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cottage_home"))
        .stdout(predicate::str::contains("shrine_of_dawn"));
}

#[test]
fn list_unknown_kind_fails() {
    ic_demo(&["list", "dragons"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown kind"));
}

#[test]
fn show_place_as_json() {
    ic_demo(&["show", "place", "cottage_home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"zone_id\": \"cottage\""));
}

#[test]
fn show_missing_record_fails() {
    ic_demo(&["show", "item", "unicorn_horn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_is_deterministic() {
    let first = ic_demo(&["generate", "meadow_path", "--seed", "11", "-n", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gen_meadow_path_"))
        .get_output()
        .stdout
        .clone();
    ic_demo(&["generate", "meadow_path", "--seed", "11", "-n", "2"])
        .assert()
        .success()
        .stdout(first);
}

#[test]
fn generate_unknown_place_fails() {
    ic_demo(&["generate", "moon_base"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown place"));
}

// ---------------------------------------------------------------------------
// begin / step / journal
// ---------------------------------------------------------------------------

#[test]
fn begin_unknown_place_fails() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    ic_demo(&["begin", "moon_base"])
        .arg("--save")
        .arg(&save)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown place"));
    assert!(!save.exists());
}

#[test]
fn enter_then_choose_writes_a_page() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    begin_session(&save);

    ic_demo(&["step", "enter"])
        .arg("--save")
        .arg(&save)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phase\": \"offering\""));

    ic_demo(&["step", "choose", "--choice", "1", "--markdown", "--date", "2024-03-01"])
        .arg("--save")
        .arg(&save)
        .assert()
        .success()
        .stdout(predicate::str::contains("page_id: cottage_home_tea_20240301_1"));

    ic().args(["journal", "--save"])
        .arg(&save)
        .assert()
        .success()
        .stdout(predicate::str::contains("date: 2024-03-01"));
}

#[test]
fn journal_starts_empty() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    begin_session(&save);

    ic().args(["journal", "--save"])
        .arg(&save)
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn choose_without_choice_fails() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    begin_session(&save);

    ic_demo(&["step", "choose"])
        .arg("--save")
        .arg(&save)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid action"));
}

#[test]
fn unknown_step_command_fails() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("save.json");
    begin_session(&save);

    ic_demo(&["step", "dance"])
        .arg("--save")
        .arg(&save)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command"));
}

#[test]
fn step_without_save_file_fails() {
    let dir = TempDir::new().unwrap();
    ic_demo(&["step", "enter"])
        .arg("--save")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read save file"));
}
