//! End-to-end tests for the `tidesync` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tidesync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tidesync").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn replay_prints_resulting_collection() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("deltas.json"),
        r#"[
            {"type": "insert", "model": "Player", "data": {"id": 1, "name": "Alice"}},
            {"type": "insert", "model": "Player", "data": {"id": 2, "name": "Bob"}},
            {"type": "delete", "model": "Player", "data": {"id": 1, "name": "Alice"}}
        ]"#,
    )
    .unwrap();

    tidesync(&dir)
        .args(["replay", "deltas.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Bob\""))
        .stdout(predicate::str::contains("Alice").not())
        .stderr(predicate::str::contains("3 applied, 0 failed"));
}

#[test]
fn replay_starts_from_initial_snapshot() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("initial.json"),
        r#"[{"slug": "red", "size": 1}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("deltas.json"),
        r#"[{"type": "update", "model": "Team",
             "oldData": {"slug": "red"}, "newData": {"slug": "red", "size": 5}}]"#,
    )
    .unwrap();

    tidesync(&dir)
        .args([
            "replay",
            "deltas.json",
            "--initial",
            "initial.json",
            "--id-field",
            "slug",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"size\": 5"));
}

#[test]
fn replay_reports_failed_deltas_and_still_prints() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("deltas.json"),
        r#"[
            {"type": "update", "model": "Player",
             "oldData": {"id": 9}, "newData": {"id": 9, "name": "Ghost"}},
            {"type": "insert", "model": "Player", "data": {"id": 1}}
        ]"#,
    )
    .unwrap();

    tidesync(&dir)
        .args(["replay", "deltas.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 1"))
        .stderr(predicate::str::contains("delta #0: no Player item matches the delta"))
        .stderr(predicate::str::contains("1 applied, 1 failed"));
}

#[test]
fn replay_rejects_malformed_delta_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("deltas.json"), r#"{"type": "insert"}"#).unwrap();

    tidesync(&dir)
        .args(["replay", "deltas.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid delta file"));
}

#[test]
fn replay_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    tidesync(&dir)
        .args(["replay", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read delta file"));
}

#[test]
fn config_without_file_shows_defaults() {
    let dir = TempDir::new().unwrap();

    tidesync(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("ws://localhost:5800/"))
        .stdout(predicate::str::contains("call_timeout_ms = 30000"));
}

#[test]
fn config_reads_given_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("client.toml"),
        "[server]\naddress = \"ws://sync.internal:9000/\"\n\n[codec]\nformat = \"msgpack\"\n",
    )
    .unwrap();

    tidesync(&dir)
        .args(["--config", "client.toml", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loaded from client.toml"))
        .stdout(predicate::str::contains("ws://sync.internal:9000/"))
        .stdout(predicate::str::contains("format = \"msgpack\""));
}

#[test]
fn broken_config_file_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tidesync.toml"), "[rpc]\ncall_timeout_ms = -1\n").unwrap();

    tidesync(&dir)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
