//! Cluster node discovery over JSON-RPC
//!
//! [`ClusterDirectory`] asks a cluster endpoint for its advertised members
//! (`getClusterNodes`) and returns their RPC addresses. Discovery is a
//! prerequisite for the whole run, so there are no retries: any failure is
//! returned to the caller as a [`DiscoveryError`].

pub mod dedupe;

pub use dedupe::dedupe;

use crate::{
    error::{AppError, DiscoveryError, Result},
    models::NodeAddress,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeouts applied to the discovery request
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Time allowed to establish the TCP/TLS connection
    pub connect_timeout: Duration,
    /// Time allowed for the whole request, body included
    pub request_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            connect_timeout: crate::defaults::DISCOVERY_CONNECT_TIMEOUT,
            request_timeout: crate::defaults::DISCOVERY_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ClusterNodesRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
}

impl ClusterNodesRequest {
    fn new() -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "getClusterNodes",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClusterNodesResponse {
    result: Vec<NodeDescriptor>,
}

#[derive(Debug, Deserialize)]
struct NodeDescriptor {
    #[serde(default)]
    rpc: Option<String>,
}

/// Client for the cluster's node listing endpoint
pub struct ClusterDirectory {
    client: Client,
}

impl ClusterDirectory {
    /// Create a directory client with the given timeouts
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(concat!("snapshot-node-finder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch the advertised RPC addresses of every cluster node.
    ///
    /// Descriptors without an RPC address are skipped. The list may contain
    /// duplicates; see [`dedupe`].
    pub async fn fetch_nodes(&self, endpoint_url: &str) -> std::result::Result<Vec<NodeAddress>, DiscoveryError> {
        let response = self
            .client
            .post(endpoint_url)
            .json(&ClusterNodesRequest::new())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let parsed: ClusterNodesResponse = serde_json::from_slice(&body)
            .map_err(|e| DiscoveryError::Payload(e.to_string()))?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|node| node.rpc)
            .filter_map(|rpc| NodeAddress::new(rpc).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method},
        Mock, MockServer, ResponseTemplate,
    };

    fn directory() -> ClusterDirectory {
        ClusterDirectory::new(&DiscoveryConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_nodes_sends_jsonrpc_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"jsonrpc": "2.0", "id": 1, "method": "getClusterNodes"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": [
                    {"pubkey": "A", "rpc": "1.2.3.4:8899", "gossip": "1.2.3.4:8001"},
                    {"pubkey": "B", "rpc": "5.6.7.8:8899"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let nodes = directory().fetch_nodes(&server.uri()).await.unwrap();
        let nodes: Vec<&str> = nodes.iter().map(|n| n.as_str()).collect();
        assert_eq!(nodes, vec!["1.2.3.4:8899", "5.6.7.8:8899"]);
    }

    #[tokio::test]
    async fn test_fetch_nodes_drops_missing_addresses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"rpc": "1.2.3.4:8899"},
                    {"rpc": null},
                    {"rpc": ""},
                    {"gossip": "9.9.9.9:8001"},
                    {"rpc": "1.2.3.4:8899"}
                ]
            })))
            .mount(&server)
            .await;

        let nodes = directory().fetch_nodes(&server.uri()).await.unwrap();
        // Duplicates are kept here; dedupe is a separate step
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.as_str() == "1.2.3.4:8899"));
    }

    #[tokio::test]
    async fn test_fetch_nodes_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = directory().fetch_nodes(&server.uri()).await.unwrap_err();
        assert_eq!(err, DiscoveryError::Status(503));
    }

    #[tokio::test]
    async fn test_fetch_nodes_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
            .mount(&server)
            .await;

        let err = directory().fetch_nodes(&server.uri()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Payload(_)));
    }

    #[tokio::test]
    async fn test_fetch_nodes_jsonrpc_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32601, "message": "Method not found"}
            })))
            .mount(&server)
            .await;

        let err = directory().fetch_nodes(&server.uri()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Payload(_)));
    }

    #[tokio::test]
    async fn test_fetch_nodes_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = DiscoveryConfig {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_millis(300),
        };
        let err = ClusterDirectory::new(&config)
            .unwrap()
            .fetch_nodes(&server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fetch_nodes_unreachable_endpoint() {
        // Port 1 on loopback is never served in the test environment
        let err = directory().fetch_nodes("http://127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Transport(_) | DiscoveryError::Timeout(_)));
    }
}
