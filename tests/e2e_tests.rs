//! End-to-end tests for a full discovery and probing run
//!
//! Every node is a local mock server, so the tests need no network access.

use serde_json::json;
use snapshot_node_finder::{
    App, Config, DiscoveryError, AppError, ProbeConfig, ProbeError, RankOrder,
};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Node serving `bytes` of snapshot immediately
async fn fast_node(bytes: usize) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snapshot.tar.bz2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; bytes]))
        .mount(&server)
        .await;
    server
}

/// Node whose response headers arrive after `delay`
async fn slow_node(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(&server)
        .await;
    server
}

async fn discovery_endpoint(rpc_addresses: &[String]) -> MockServer {
    let server = MockServer::start().await;
    let nodes: Vec<_> = rpc_addresses.iter().map(|rpc| json!({ "pubkey": "x", "rpc": rpc })).collect();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": nodes
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn test_config(discovery: &MockServer) -> Config {
    Config {
        discovery_url: discovery.uri(),
        window_seconds: 1,
        concurrency: 4,
        enable_color: false,
        ..Config::default()
    }
}

fn quick_probes() -> ProbeConfig {
    ProbeConfig {
        timeout_grace: Duration::from_millis(500),
        ..ProbeConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_duplicates_probed_once_and_failures_reported() {
    let fast = fast_node(512 * 1024).await;
    let slow = slow_node(Duration::from_secs(10)).await;
    let fast_addr = fast.address().to_string();
    let slow_addr = slow.address().to_string();

    let discovery = discovery_endpoint(&[fast_addr.clone(), fast_addr.clone(), slow_addr.clone()]).await;

    let report = App::new(test_config(&discovery))
        .with_probe_config(quick_probes())
        .run()
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 1);
    assert!(!report.interrupted);

    // Throughput order: the working node first, the failure last
    assert_eq!(report.results[0].rank, 1);
    assert_eq!(report.results[0].result.address.as_str(), fast_addr);
    assert!(report.results[0].result.is_success());

    assert_eq!(report.results[1].result.address.as_str(), slow_addr);
    assert!(matches!(report.results[1].result.error(), Some(ProbeError::Timeout(_))));

    let fast_requests = fast.received_requests().await.unwrap();
    assert_eq!(fast_requests.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_snapshot_is_a_failure_not_an_abort() {
    let missing = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&missing)
        .await;
    let fast = fast_node(64 * 1024).await;

    let discovery = discovery_endpoint(&[missing.address().to_string(), fast.address().to_string()]).await;

    let mut config = test_config(&discovery);
    config.order = RankOrder::Arrival;

    let report = App::new(config).with_probe_config(quick_probes()).run().await.unwrap();

    assert_eq!(report.results.len(), 2);
    let failure = report.results.iter().find(|r| !r.result.is_success()).unwrap();
    assert_eq!(failure.result.error(), Some(&ProbeError::Status(404)));
    assert_eq!(
        report.results.iter().map(|r| r.rank).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn test_empty_cluster_gives_empty_report() {
    let discovery = discovery_endpoint(&[]).await;

    let report = App::new(test_config(&discovery)).run().await.unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.summary.total, 0);
    assert!(report.summary.fastest.is_none());
}

#[tokio::test]
async fn test_discovery_failure_aborts_run() {
    let discovery = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&discovery)
        .await;

    let err = App::new(test_config(&discovery)).run().await.unwrap_err();

    assert!(matches!(err, AppError::Discovery(DiscoveryError::Status(500))));
    assert_eq!(err.exit_code(), 2);
}
