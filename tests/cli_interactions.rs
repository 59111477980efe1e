//! CLI options interaction tests
//!
//! These tests run the `edgescan` binary inside a scratch directory so the
//! default `ip.txt` / `ip.csv` / `.env` paths never touch the repository.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;
use std::process::Command;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const VALID_TRACE: &str = "fl=1\nh=127.0.0.1\nuag=Mozilla/5.0\ncolo=AMS\n";

/// Helper function to create a test command running in `dir`
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("edgescan").unwrap();
    cmd.current_dir(dir.path());
    for (key, _) in std::env::vars() {
        if key.starts_with("EDGESCAN_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Scratch directory with an `ip.txt` holding `content`
fn workspace_with_candidates(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ip.txt"), content).unwrap();
    dir
}

/// A local port with nothing listening on it
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn test_help_lists_scan_options() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--speedtest"))
        .stdout(predicate::str::contains("--trace-url"))
        .stdout(predicate::str::contains("--outfile"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("edgescan"));
}

#[test]
fn test_invalid_arguments_rejected() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir).arg("--bogus").assert().failure();
    create_test_cmd(&dir).args(["--timeout", "0"]).assert().failure();
    create_test_cmd(&dir).args(["--tls", "sometimes"]).assert().failure();
    create_test_cmd(&dir).args(["-p", "99999"]).assert().failure();
}

#[test]
fn test_cli_validation_exit_code() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .args(["-p", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Port must be between 1 and 65535"));

    create_test_cmd(&dir)
        .args(["-f", "same.txt", "-o", "same.txt"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_input_file_is_io_error() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .args(["-f", "missing.txt", "--no-progress"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("missing.txt"));

    assert!(!dir.path().join("ip.csv").exists());
}

#[test]
fn test_invalid_env_value_is_config_error() {
    let dir = workspace_with_candidates("127.0.0.1\n");

    create_test_cmd(&dir)
        .env("EDGESCAN_MAX_CONCURRENCY", "lots")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("EDGESCAN_MAX_CONCURRENCY"));
}

#[test]
fn test_no_reachable_addresses_exits_cleanly_without_csv() {
    let port = closed_port();
    let dir = workspace_with_candidates(&format!("# local only\n127.0.0.1:{}\n", port));

    create_test_cmd(&dir)
        .args([
            "--tls", "false",
            "--trace-url", "127.0.0.1/cdn-cgi/trace",
            "-s", "0",
            "--timeout", "1",
            "--no-progress",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No reachable addresses found (1 candidates attempted)"));

    assert!(!dir.path().join("ip.csv").exists());
}

#[test]
fn test_env_file_supplies_defaults() {
    let port = closed_port();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ranges.txt"), format!("127.0.0.1:{}\n", port)).unwrap();
    fs::write(
        dir.path().join(".env"),
        "EDGESCAN_INPUT_FILE=ranges.txt\nEDGESCAN_TLS=false\nEDGESCAN_TRACE_URL=127.0.0.1/cdn-cgi/trace\nEDGESCAN_SPEED_TEST_WORKERS=0\n",
    )
    .unwrap();

    create_test_cmd(&dir)
        .args(["--timeout", "1", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 candidates attempted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_latency_scan_writes_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cdn-cgi/trace"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VALID_TRACE))
        .mount(&server)
        .await;

    let port = server.address().port();
    let closed = closed_port();
    let dir = workspace_with_candidates(&format!("127.0.0.1:{}\n127.0.0.1:{}\n", port, closed));
    let mut cmd = create_test_cmd(&dir);
    cmd.args([
        "--tls", "false",
        "--trace-url", "127.0.0.1/cdn-cgi/trace",
        "-s", "0",
        "--timeout", "2",
        "--no-progress",
        "-o", "out.csv",
    ]);

    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap();
    assert
        .success()
        .stdout(predicate::str::contains("Found reachable address"))
        .stdout(predicate::str::contains("address=127.0.0.1 colo=AMS latency_ms="))
        .stdout(predicate::str::contains("Edge Scan Results"))
        .stdout(predicate::str::contains("Results written to out.csv"));

    let csv = fs::read_to_string(dir.path().join("out.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "IP Address,Port,TLS,Latency");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with(&format!("127.0.0.1,{},false,", port)));
    assert!(lines[1].ends_with(" ms"));
}
