//! Integration tests for the pinv binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn pinv_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pinv"));
    cmd.env_remove("PINV_TIMEOUT_MS").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn run(args: &[&str], files: &[&PathBuf]) -> Output {
    pinv_cmd().args(args).args(files).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// Usage errors
// ============================================================================

#[test]
fn test_consistency_needs_two_files() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x = 1\n");

    let output = run(&["check"], &[&a]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_usage_error_precedes_parsing() {
    // A single unreadable file still fails as a usage error
    let output = pinv_cmd()
        .args(["check", "--consistency", "/nonexistent/a.sol"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_mode_flags_conflict() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x = 1\n");
    let b = write(dir.path(), "b.sol", "x = 1\n");

    let output = run(&["check", "--consistency", "--minimality"], &[&a, &b]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_collect_mode() {
    let dir = TempDir::new().unwrap();
    let log = write(dir.path(), "model.tina", "");

    let output = pinv_cmd()
        .args(["collect", "--tool", "tina", "--mode", "everything", "--log"])
        .arg(&log)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// check --consistency
// ============================================================================

#[test]
fn test_consistent_files() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x = 1\ny = 1\n");
    let b = write(dir.path(), "b.sol", "y = 1\nx = 1\n");

    let output = run(&["check"], &[&a, &b]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    let text = stdout(&output);
    assert!(text.contains("No discrepancy found (UNSAT)"));
    assert!(text.contains("Consistent groups:"));
}

#[test]
fn test_discrepant_files() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x + y = 3\n");
    let b = write(dir.path(), "b.sol", "x + y = 3\nx - y = 1\n");

    let output = run(&["check"], &[&a, &b]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("DISCREPANCY FOUND"));
    assert!(text.contains("=> Satisfies invariants of set A, violates set B."));
    assert!(text.contains("Invariant : \"x - y = 1\" is contradicted"));
}

#[test]
fn test_groups_in_json() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "p + q = 2\nq + r = 3\n");
    let b = write(dir.path(), "b.sol", "p = 0\n");
    let c = write(dir.path(), "c.sol", "p - r = -1\np + q = 2\n");

    let output = run(&["check", "--json", "--no-dedup"], &[&a, &b, &c]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["pairs"].as_array().unwrap().len(), 3);
    let groups = json["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].as_array().unwrap().len(), 2);
    assert_eq!(json["pairs"][1]["verdict"], "equivalent");
}

#[test]
fn test_malformed_solution_file() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x = 1\n");
    let b = write(dir.path(), "b.sol", "x = 1\nx + = 2\n");

    let output = run(&["check"], &[&a, &b]);
    assert_eq!(output.status.code(), Some(1));
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("b.sol"));
    assert!(err.contains("line 2"));
}

#[test]
fn test_unknown_constant_is_an_error() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "p0 + p1 = ?\n");
    let b = write(dir.path(), "b.sol", "p0 + p1 = 1\n");

    let output = run(&["check"], &[&a, &b]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown constant"));
}

// ============================================================================
// check --minimality
// ============================================================================

#[test]
fn test_minimality_single_file() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x + y = 2\nx = 1\ny = 1\n");

    let output = run(&["check", "--minimality"], &[&a]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("3 invariants, 1 redundant, 3 solver queries."));
    assert!(text.contains("#0: x + y = 2"));
}

#[test]
fn test_minimality_independent_json() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x + y = 2\nx = 1\ny = 1\nz = 5\n");

    let output = run(
        &["check", "--minimality", "--independent", "--workers", "2", "--json"],
        &[&a],
    );
    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["redundant"].as_array().unwrap().len(), 3);
    assert_eq!(json[0]["queries"], 4);
}

// ============================================================================
// logs / collect
// ============================================================================

const TINA_LOG: &str = "\
net model
P-SEMI-FLOWS GENERATING SET
p0 p1 (1)
0.000s
T-SEMI-FLOWS GENERATING SET
t0 t1 (0)
0.000s
ANALYSIS COMPLETED
";

const PETRISPOT_LOG: &str = "\
Computed 1 P semiflows in 0 ms.
inv : p0 + p1 = 1
Total of 1 invariants.
Computed 1 T semiflows in 0 ms.
inv : t0 + t1 = 0
Total of 1 invariants.
";

#[test]
fn test_logs_from_two_tools_agree() {
    let dir = TempDir::new().unwrap();
    let tina = write(dir.path(), "model.tina", TINA_LOG);
    let petri = write(dir.path(), "model.petri64", PETRISPOT_LOG);

    let output = run(&["logs"], &[&tina, &petri]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    let text = stdout(&output);
    assert!(text.contains("=== Comparing Place Flows ==="));
    assert!(text.contains("=== Comparing Transition Flows ==="));
}

#[test]
fn test_logs_rejects_solution_files() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sol", "x = 1\n");
    let b = write(dir.path(), "b.sol", "x = 1\n");

    let output = run(&["logs"], &[&a, &b]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("unsupported configuration"), "{}", err);
}

#[test]
fn test_logs_rejects_greatspn_before_reading() {
    let dir = TempDir::new().unwrap();
    let tina = write(dir.path(), "model.tina", TINA_LOG);
    let missing = dir.path().join("model.tba");

    let output = pinv_cmd()
        .arg("logs")
        .arg(&tina)
        .arg(&missing)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("unsupported configuration"), "{}", err);
    assert!(!err.contains("I/O error"), "{}", err);
}

#[test]
fn test_collect_tina_strips_log() {
    let dir = TempDir::new().unwrap();
    let log = write(dir.path(), "model.tina", TINA_LOG);

    let output = pinv_cmd()
        .args(["collect", "--tool", "tina", "--mode", "psemiflows", "--log"])
        .arg(&log)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let sol = fs::read_to_string(dir.path().join("model.tina.sol")).unwrap();
    assert_eq!(sol, "p0 + p1 = 1\n");
    let residual = fs::read_to_string(&log).unwrap();
    assert!(!residual.contains("(1)"));
    assert!(!residual.contains("(0)"));
    assert!(residual.contains("ANALYSIS COMPLETED"));
}

#[test]
fn test_collect_greatspn_with_net() {
    let dir = TempDir::new().unwrap();
    let net = write(
        dir.path(),
        "model.net",
        "|0|\n|\nf 0 2 0 1 0 0 0\nA 1 0 0 0 0 0\nB 0 0 0 0 0 0\nT 1.0 0 0 1 0\n   1 1 0 0\n",
    );
    let pba = write(dir.path(), "model.pba", "1\n2 1 1 1 2\n0\n");

    let output = pinv_cmd()
        .args(["collect", "--tool", "greatspn", "--mode", "pflows", "--log"])
        .arg(&pba)
        .arg("--net")
        .arg(&net)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let sol = fs::read_to_string(dir.path().join("model.pba.sol")).unwrap();
    assert_eq!(sol, "A + B = ?\n");
    assert_eq!(fs::read_to_string(&pba).unwrap(), "1\n2 1 1 1 2\n0\n");
}
