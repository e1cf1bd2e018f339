//! HTTP JSON-RPC client for the node.
//!
//! Every call is a standalone JSON-RPC 2.0 request with a fixed id:
//!
//! ```json
//! POST <node url>
//! { "jsonrpc": "2.0", "method": "chain_getHeader", "params": [], "id": 0 }
//! ```
//!
//! and only the `result` member of the reply is used.

use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{NodeRpc, RpcError};
use crate::config::RpcClientConfig;

/// Request id sent with every call; responses are never multiplexed.
const REQUEST_ID: u64 = 0;

/// Node RPC client over HTTP POST.
///
/// The underlying `reqwest` client is cheap to share and pools connections,
/// so one instance serves all concurrent scrapes.
#[derive(Clone, Debug)]
pub struct HttpNodeRpc {
    url: String,
    client: Client,
}

impl HttpNodeRpc {
    /// Builds a client for `cfg.url` with `cfg.timeout` applied per call.
    pub fn new(cfg: &RpcClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            url: cfg.url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a [Value],
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
}

/// Pulls `result` out of a raw response body.
fn extract_result(method: &str, body: &str) -> Result<Value, RpcError> {
    serde_json::from_str::<JsonRpcResponse>(body)
        .ok()
        .and_then(|resp| resp.result)
        .ok_or_else(|| RpcError::Protocol {
            method: method.to_string(),
            body: body.to_string(),
        })
}

impl NodeRpc for HttpNodeRpc {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params: &params,
            id: REQUEST_ID,
        };

        let transport = |e: reqwest::Error| RpcError::Transport {
            method: method.to_string(),
            reason: e.to_string(),
        };

        let body = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)?;

        extract_result(method, &body)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header as header_matcher, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(url: String, timeout: Duration) -> HttpNodeRpc {
        HttpNodeRpc::new(&RpcClientConfig { url, timeout }).expect("client should build")
    }

    #[test]
    fn extract_result_returns_result_member() {
        let value = extract_result("system_name", r#"{"jsonrpc":"2.0","result":"Parity Polkadot","id":0}"#)
            .expect("result should be extracted");
        assert_eq!(value, json!("Parity Polkadot"));
    }

    #[test]
    fn extract_result_keeps_raw_body_on_rpc_error() {
        let body = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":0}"#;
        match extract_result("babe_epochAuthorship", body).unwrap_err() {
            RpcError::Protocol { method, body: raw } => {
                assert_eq!(method, "babe_epochAuthorship");
                assert_eq!(raw, body);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn extract_result_rejects_non_json() {
        let err = extract_result("system_health", "<html>bad gateway</html>").unwrap_err();
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn call_posts_jsonrpc_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_matcher("content-type", "application/json"))
            .and(body_partial_json(json!({
                "jsonrpc": "2.0",
                "method": "chain_getBlock",
                "params": ["0xabc"],
                "id": 0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "result": { "block": { "header": { "number": "0x10" } } },
                "id": 0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rpc = client_for(server.uri(), Duration::from_secs(2));
        let value = rpc
            .call("chain_getBlock", vec![json!("0xabc")])
            .await
            .expect("call should succeed");
        assert_eq!(value["block"]["header"]["number"], json!("0x10"));
    }

    #[tokio::test]
    async fn non_json_reply_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let rpc = client_for(server.uri(), Duration::from_secs(2));
        let err = rpc.call("system_health", vec![]).await.unwrap_err();
        match err {
            RpcError::Protocol { body, .. } => assert_eq!(body, "internal error"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_node_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "jsonrpc": "2.0", "result": 1, "id": 0 }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let rpc = client_for(server.uri(), Duration::from_millis(50));
        let err = rpc.call("system_health", vec![]).await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_node_is_transport_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let rpc = client_for("http://127.0.0.1:9".to_string(), Duration::from_secs(1));
        let err = rpc.call("system_name", vec![]).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.method(), "system_name");
    }
}
