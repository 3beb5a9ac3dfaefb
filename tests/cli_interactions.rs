//! CLI behaviour tests against the compiled `snf` binary

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::process::Command;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Command isolated from the caller's environment and any `.env` file
fn create_test_cmd(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("snf").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("DISCOVERY_URL")
        .env_remove("MEASURE_SECONDS")
        .env_remove("CONCURRENCY")
        .env_remove("RANK_ORDER")
        .env_remove("ENABLE_COLOR");
    cmd
}

async fn discovery_endpoint(result: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result
        })))
        .mount(&server)
        .await;
    server
}

/// Run the command off the async runtime so mock servers keep serving
async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
        .assert()
}

#[test]
fn test_help_flag() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--window"))
        .stdout(predicate::str::contains("--concurrency"));
}

#[test]
fn test_version_flag() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_zero_window_rejected() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .args(["--window", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("greater than 0"));
}

#[test]
fn test_conflicting_color_flags_rejected() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .args(["--color", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--no-color"));
}

#[test]
fn test_invalid_discovery_url_rejected() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .args(["--url", "ftp://example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONFIG"));
}

#[test]
fn test_invalid_env_file_value_rejected() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(workdir.path().join(".env"), "CONCURRENCY=plenty\n").unwrap();

    create_test_cmd(&workdir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONCURRENCY"));
}

#[test]
fn test_unreachable_discovery_exits_with_network_code() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .args(["--url", "http://127.0.0.1:1", "--no-color"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("DISCOVERY"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_json_output_for_empty_cluster() {
    let workdir = TempDir::new().unwrap();
    let discovery = discovery_endpoint(json!([])).await;

    let mut cmd = create_test_cmd(&workdir);
    cmd.args(["--url", &discovery.uri(), "--json"]);

    let assert = run_blocking(cmd).await.success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(report["results"], json!([]));
    assert_eq!(report["summary"]["total"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_report_ranks_nodes() {
    let workdir = TempDir::new().unwrap();

    let fast = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snapshot.tar.bz2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 256 * 1024]))
        .mount(&fast)
        .await;

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    let discovery = discovery_endpoint(json!([
        { "rpc": fast.address().to_string() },
        { "rpc": broken.address().to_string() },
        { "rpc": null }
    ]))
    .await;

    let mut cmd = create_test_cmd(&workdir);
    cmd.args(["--url", &discovery.uri(), "--window", "1", "--no-color"]);

    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains(format!("1) {}:", fast.address())))
        .stdout(predicate::str::contains(format!("2) {}: Error (HTTP 503)", broken.address())))
        .stdout(predicate::str::contains("2 nodes probed"));
}
