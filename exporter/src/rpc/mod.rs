//! Node JSON-RPC access.
//!
//! [`NodeRpc`] is the seam between scrape logic and the network: the
//! production implementation is [`HttpNodeRpc`], tests plug in canned
//! responses. [`ScrapeSession`] wraps a client for the lifetime of one
//! request and keeps the per-scrape bookkeeping (transport error count,
//! optional latency records).

use std::future::Future;

use serde_json::Value;

pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use error::RpcError;
pub use http::HttpNodeRpc;
pub use session::ScrapeSession;

/// Issues one JSON-RPC call and returns its `result` member.
///
/// Implementations must be shareable across concurrently handled requests.
pub trait NodeRpc: Send + Sync {
    fn call(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Value, RpcError>> + Send;
}
