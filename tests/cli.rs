//! Integration tests for the non-interactive command line

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run the binary against a throwaway store. An empty config file keeps the
/// user's own config out of the picture.
fn run_in(store: &Path, args: &[&str]) -> (String, String, i32) {
    let config = store.join("config.toml");
    if !config.exists() {
        fs::write(&config, "").expect("Failed to write config");
    }

    let output = Command::new(env!("CARGO_BIN_EXE_neurosheets"))
        .arg("--store")
        .arg(store)
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn store() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_basic_arithmetic() {
    let dir = store();
    let (stdout, _, code) = run_in(dir.path(), &["-c", "=1+2*3"]);
    assert_eq!(stdout.trim(), "7");
    assert_eq!(code, 0);
}

#[test]
fn test_leading_equals_is_optional() {
    let dir = store();
    let (stdout, _, code) = run_in(dir.path(), &["-c", "(10-4)/4"]);
    assert_eq!(stdout.trim(), "1.5");
    assert_eq!(code, 0);
}

#[test]
fn test_bad_formula_prints_zero() {
    let dir = store();
    let (stdout, _, code) = run_in(dir.path(), &["-c", "=NOPE(1)"]);
    assert_eq!(stdout.trim(), "0");
    assert_eq!(code, 0);
}

#[test]
fn test_import_then_evaluate() {
    let dir = store();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, "10,20\n30,40\n").unwrap();

    let (stdout, _, code) = run_in(dir.path(), &["--import", csv.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Imported 4 cells"));

    // The import was saved to the current sheet slot.
    let (stdout, _, code) = run_in(dir.path(), &["-c", "=SUM(A1:B2)"]);
    assert_eq!(stdout.trim(), "100");
    assert_eq!(code, 0);

    let (stdout, _, _) = run_in(dir.path(), &["-c", "=MAX(A1:A2)+B1"]);
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn test_export_csv_and_xls() {
    let dir = store();
    let csv = dir.path().join("data.csv");
    fs::write(&csv, "1,2\n3,4\n").unwrap();
    run_in(dir.path(), &["--import", csv.to_str().unwrap()]);

    let out = dir.path().join("out.csv");
    let (stdout, _, code) = run_in(dir.path(), &["-o", out.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Exported to"));
    let exported = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = exported.lines().collect();
    assert_eq!(lines.len(), 50);
    assert!(lines[0].starts_with("1,2,"));
    assert_eq!(lines[0].split(',').count(), 20);

    let out = dir.path().join("out.xls");
    let (_, _, code) = run_in(dir.path(), &["-o", out.to_str().unwrap()]);
    assert_eq!(code, 0);
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<td>3</td><td>4</td>"));
}

#[test]
fn test_export_unknown_extension_fails() {
    let dir = store();
    let out = dir.path().join("out.pdf");
    let (_, stderr, code) = run_in(dir.path(), &["-o", out.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_new_and_list_sheets() {
    let dir = store();
    let (stdout, _, code) = run_in(dir.path(), &["--new", "Q1 Budget"]);
    assert_eq!(code, 0);
    let id = stdout.trim().to_string();
    assert!(!id.is_empty());

    let (stdout, _, code) = run_in(dir.path(), &["--list"]);
    assert_eq!(code, 0);
    let line = stdout.lines().next().unwrap();
    let fields: Vec<&str> = line.split('\t').collect();
    assert_eq!(fields[0], id);
    assert_eq!(fields[1], "Q1 Budget");
}

#[test]
fn test_open_sheet_by_id() {
    let dir = store();
    let (stdout, _, _) = run_in(dir.path(), &["--new", "Scratch"]);
    let id = stdout.trim().to_string();

    let csv = dir.path().join("data.csv");
    fs::write(&csv, "5\n").unwrap();
    let (_, _, code) = run_in(dir.path(), &[&id, "--import", csv.to_str().unwrap()]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_in(dir.path(), &[&id, "-c", "=A1*2"]);
    assert_eq!(stdout.trim(), "10");

    // The current-sheet slot is untouched.
    let (stdout, _, _) = run_in(dir.path(), &["-c", "=A1*2"]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_missing_sheet_id_fails() {
    let dir = store();
    let (_, stderr, code) = run_in(dir.path(), &["no-such-sheet", "-c", "=1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Failed to load sheet no-such-sheet"));
}

#[test]
fn test_unknown_option() {
    let dir = store();
    let (_, stderr, code) = run_in(dir.path(), &["--bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown option: --bogus"));
    assert!(stderr.contains("Usage:"));
}

#[test]
fn test_help() {
    let dir = store();
    let (_, stderr, code) = run_in(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Usage: neurosheets"));
}
