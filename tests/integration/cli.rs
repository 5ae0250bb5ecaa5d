use std::fs;
use std::process::Command;

use tempfile::TempDir;

use crate::integration::support::{scenario_image, scenario_tree};

fn grid() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_grid"));
    command.env("GRID_LOG_OUTPUT", "stderr");
    command
}

fn grider() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_grider"));
    command.env("GRID_LOG_OUTPUT", "stderr");
    command
}

#[test]
fn grid_builds_image_from_gridfile() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("root");
    scenario_tree(&source);
    let dest = temp.path().join("out.grid");
    let gridfile = temp.path().join(".gridfile");
    fs::write(&gridfile, format!("{}\n{}\n", source.display(), dest.display())).unwrap();

    let output = grid().arg(&gridfile).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(dest.is_file());
}

#[test]
fn grid_fails_on_bad_input() {
    let temp = TempDir::new().unwrap();

    assert!(!grid().output().unwrap().status.success());

    let missing = temp.path().join("missing");
    assert!(!grid().arg(&missing).output().unwrap().status.success());

    let one_line = temp.path().join("one-line");
    fs::write(&one_line, "only-root\n").unwrap();
    assert!(!grid().arg(&one_line).output().unwrap().status.success());

    let bad_root = temp.path().join("bad-root");
    fs::write(&bad_root, format!("{}\nout.grid\n", missing.display())).unwrap();
    assert!(!grid().arg(&bad_root).output().unwrap().status.success());
}

#[test]
fn grider_cat_writes_raw_bytes() {
    let (_temp, image) = scenario_image();
    let output = grider().arg(&image).args(["cat", "/sub/b.txt"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, b"bye");
}

#[test]
fn grider_cat_missing_exits_nonzero_with_no_output() {
    let (_temp, image) = scenario_image();
    let output = grider().arg(&image).args(["cat", "/nope"]).output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn grider_ls_lists_root() {
    let (_temp, image) = scenario_image();
    let output = grider().arg(&image).arg("ls").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("sub"));
    assert!(stdout.contains("a.txt"));
}

#[test]
fn grider_rejects_unknown_command_and_bad_image() {
    let (temp, image) = scenario_image();
    assert!(!grider().arg(&image).args(["rm", "/a.txt"]).output().unwrap().status.success());

    let garbage = temp.path().join("garbage.grid");
    fs::write(&garbage, b"abc").unwrap();
    assert!(!grider().arg(&garbage).arg("ls").output().unwrap().status.success());
}
