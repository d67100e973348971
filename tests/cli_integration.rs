//! Integration tests for the `collapse` binary
//!
//! Each test runs the binary in its own temporary directory so a stray
//! `collapse.toml` or `COLLAPSE_*` variable cannot leak in.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};
use tempfile::TempDir;

fn collapse_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_collapse"));
    cmd.current_dir(dir.path())
        .env_remove("COLLAPSE_CONFIG")
        .env_remove("COLLAPSE_GROUPS")
        .env_remove("COLLAPSE_MAX_GAP")
        .env_remove("COLLAPSE_DIMENSION")
        .env_remove("COLLAPSE_START_FIELD")
        .env_remove("COLLAPSE_END_FIELD")
        .env("RUST_LOG", "warn");
    cmd
}

fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn collapse");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for collapse")
}

fn parse_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("output line is JSON"))
        .collect()
}

const INPUT: &str = r#"{"id": "A", "start": "2024-01-01", "end": "2024-01-05"}
{"id": "A", "start": "2024-01-05", "end": "2024-01-10"}
{"id": "A", "start": "2024-01-20", "end": "2024-01-25"}
{"id": "B", "start": "2024-01-01", "end": "2024-01-05"}
"#;

#[test]
fn test_run_from_stdin_with_flags() {
    let dir = TempDir::new().unwrap();
    let mut cmd = collapse_cmd(&dir);
    cmd.args(["--group", "id", "run"]);

    let output = run_with_stdin(cmd, INPUT);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(
        parse_lines(&output.stdout),
        vec![
            json!({"id": "A", "start": "2024-01-01", "end": "2024-01-10"}),
            json!({"id": "A", "start": "2024-01-20", "end": "2024-01-25"}),
            json!({"id": "B", "start": "2024-01-01", "end": "2024-01-05"}),
        ]
    );
}

#[test]
fn test_run_with_config_file_and_output_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("collapse.toml"),
        "[collapse]\ngroups = [\"id\"]\nmax_gap = 10\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("in.jsonl"), INPUT).unwrap();

    let output = collapse_cmd(&dir)
        .args(["run", "--input", "in.jsonl", "--output", "out.jsonl", "--stats"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("\"segments\": 2"));

    let written = std::fs::read(dir.path().join("out.jsonl")).unwrap();
    assert_eq!(
        parse_lines(&written),
        vec![
            json!({"id": "A", "start": "2024-01-01", "end": "2024-01-25"}),
            json!({"id": "B", "start": "2024-01-01", "end": "2024-01-05"}),
        ]
    );
}

#[test]
fn test_unsupported_dimension_exits_with_error() {
    let dir = TempDir::new().unwrap();
    // The process exits before touching stdin, so don't pipe any
    let output = collapse_cmd(&dir)
        .args(["--dimension", "week", "run"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported dimension"));
}

#[test]
fn test_check_config_prints_unit() {
    let dir = TempDir::new().unwrap();
    let output = collapse_cmd(&dir)
        .args(["--dimension", "timestamp", "--max-gap", "30", "check-config"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid!"));
    assert!(stdout.contains("Max gap: 30 seconds"));
}

#[test]
fn test_env_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("collapse.toml"), "[collapse]\nmax_gap = 10\n").unwrap();

    let mut cmd = collapse_cmd(&dir);
    cmd.env("COLLAPSE_MAX_GAP", "0").env("COLLAPSE_GROUPS", "id");

    let output = run_with_stdin(cmd, INPUT);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(parse_lines(&output.stdout).len(), 3);
}
