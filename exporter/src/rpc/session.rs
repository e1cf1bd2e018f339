use std::time::Instant;

use serde_json::Value;

use super::{NodeRpc, RpcError};
use crate::metrics::MetricRecord;
use crate::telemetry::{ExporterMetrics, RpcOutcome};

/// Name of the per-call latency series appended to debug scrapes.
pub const RPC_LATENCY_METRIC: &str = "dot_rpc_request_seconds";

/// Per-request view over a [`NodeRpc`] client.
///
/// Lives exactly as long as one scrape; nothing recorded here outlives the
/// response it contributes to.
pub struct ScrapeSession<'a, R> {
    rpc: &'a R,
    telemetry: &'a ExporterMetrics,
    record_latency: bool,
    transport_errors: usize,
    latencies: Vec<MetricRecord>,
}

impl<'a, R: NodeRpc> ScrapeSession<'a, R> {
    pub fn new(rpc: &'a R, telemetry: &'a ExporterMetrics, record_latency: bool) -> Self {
        Self {
            rpc,
            telemetry,
            record_latency,
            transport_errors: 0,
            latencies: Vec::new(),
        }
    }

    /// Calls `method` with no parameters.
    pub async fn query(&mut self, method: &str) -> Result<Value, RpcError> {
        self.call(method, Vec::new()).await
    }

    /// Calls `method`, timing it and classifying any failure.
    pub async fn call(&mut self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let start = Instant::now();
        let result = self.rpc.call(method, params).await;
        let elapsed = start.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(_) => RpcOutcome::Ok,
            Err(RpcError::Transport { reason, .. }) => {
                self.transport_errors += 1;
                tracing::warn!(method, %reason, "node rpc transport failure");
                RpcOutcome::Transport
            }
            Err(RpcError::Protocol { body, .. }) => {
                tracing::warn!(method, %body, "node rpc returned no usable result");
                RpcOutcome::Protocol
            }
        };
        self.telemetry.observe_rpc(method, outcome, elapsed);
        tracing::debug!(method, elapsed_ms = elapsed * 1000.0, "node rpc call finished");

        if self.record_latency {
            self.latencies
                .push(MetricRecord::new(RPC_LATENCY_METRIC, elapsed).with_label("method", method));
        }

        result
    }

    /// Number of calls in this session that failed at the transport level.
    pub fn transport_errors(&self) -> usize {
        self.transport_errors
    }

    /// Consumes the session, yielding the recorded latency metrics.
    pub fn into_latency_records(self) -> Vec<MetricRecord> {
        self.latencies
    }
}
