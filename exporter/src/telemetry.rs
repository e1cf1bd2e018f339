//! Exporter self-instrumentation and its HTTP exporter.
//!
//! This module defines a [`TelemetryRegistry`] that owns a Prometheus
//! registry and the exporter's own metrics (scrape counts, node RPC
//! outcomes and latency, failed scrape groups), and an async HTTP server
//! that serves them on `/metrics` using `hyper`.
//!
//! These are about the exporter process itself and are kept separate from
//! the node metrics rendered per scrape.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Classification of a finished node RPC call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcOutcome {
    Ok,
    Transport,
    Protocol,
}

impl RpcOutcome {
    fn as_str(self) -> &'static str {
        match self {
            RpcOutcome::Ok => "ok",
            RpcOutcome::Transport => "transport",
            RpcOutcome::Protocol => "protocol",
        }
    }
}

/// Metrics describing the exporter's own work.
#[derive(Clone)]
pub struct ExporterMetrics {
    /// Handled requests per endpoint (`metrics`, `babeauthorship`, `health`).
    pub scrapes_total: IntCounterVec,
    /// Node RPC calls by method and outcome.
    pub rpc_requests_total: IntCounterVec,
    /// Node RPC latency by method, in seconds.
    pub rpc_request_seconds: HistogramVec,
    /// Scrape groups that produced no output (`runtime`, `blocks`, `identity`).
    pub scrape_group_failures_total: IntCounterVec,
}

impl ExporterMetrics {
    /// Registers exporter metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self::build()?;
        registry.register(Box::new(metrics.scrapes_total.clone()))?;
        registry.register(Box::new(metrics.rpc_requests_total.clone()))?;
        registry.register(Box::new(metrics.rpc_request_seconds.clone()))?;
        registry.register(Box::new(metrics.scrape_group_failures_total.clone()))?;
        Ok(metrics)
    }

    #[cfg(test)]
    pub(crate) fn unregistered() -> Self {
        // Metric options below are fixed and valid.
        Self::build().expect("static metric definitions should be valid")
    }

    fn build() -> Result<Self, prometheus::Error> {
        let scrapes_total = IntCounterVec::new(
            Opts::new("scrapes_total", "Requests handled, by endpoint"),
            &["endpoint"],
        )?;

        let rpc_requests_total = IntCounterVec::new(
            Opts::new("rpc_requests_total", "Node RPC calls, by method and outcome"),
            &["method", "outcome"],
        )?;

        let rpc_request_seconds = HistogramVec::new(
            HistogramOpts::new("rpc_request_seconds", "Node RPC call latency in seconds")
                .buckets(vec![
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ]),
            &["method"],
        )?;

        let scrape_group_failures_total = IntCounterVec::new(
            Opts::new(
                "scrape_group_failures_total",
                "Scrape groups that failed and were omitted from output",
            ),
            &["group"],
        )?;

        Ok(Self {
            scrapes_total,
            rpc_requests_total,
            rpc_request_seconds,
            scrape_group_failures_total,
        })
    }

    pub fn observe_rpc(&self, method: &str, outcome: RpcOutcome, seconds: f64) {
        self.rpc_requests_total
            .with_label_values(&[method, outcome.as_str()])
            .inc();
        self.rpc_request_seconds
            .with_label_values(&[method])
            .observe(seconds);
    }

    pub fn scrape(&self, endpoint: &str) {
        self.scrapes_total.with_label_values(&[endpoint]).inc();
    }

    pub fn group_failed(&self, group: &str) {
        self.scrape_group_failures_total
            .with_label_values(&[group])
            .inc();
    }
}

/// Wrapper around a Prometheus registry and the exporter metrics.
///
/// Wrap it in an [`Arc`] and share it between the scrape logic and the
/// telemetry server.
#[derive(Clone)]
pub struct TelemetryRegistry {
    registry: Registry,
    pub exporter: ExporterMetrics,
}

impl TelemetryRegistry {
    /// Creates a fresh registry prefixed with `dotexporter` and registers
    /// the exporter metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("dotexporter".to_string()), None)?;
        let exporter = ExporterMetrics::register(&registry)?;
        Ok(Self { registry, exporter })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("failed to encode telemetry metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes the exporter's own metrics.
///
/// Serves `GET /metrics` in the Prometheus text format; all other paths
/// return 404. Intended to be spawned onto a Tokio runtime.
pub async fn run_telemetry_http_server(
    telemetry: Arc<TelemetryRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let telemetry = telemetry.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let telemetry = telemetry.clone();
                handle_request(req, telemetry)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::warn!("telemetry HTTP connection error: {err}");
            }
        });
    }
}

fn text_response(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    response
}

async fn handle_request(
    req: Request<Incoming>,
    telemetry: Arc<TelemetryRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => Ok(text_response(
            StatusCode::OK,
            "text/plain; version=0.0.4",
            telemetry.gather_text(),
        )),
        _ => Ok(text_response(
            StatusCode::NOT_FOUND,
            "text/plain",
            "not found".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exporter_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = ExporterMetrics::register(&registry).expect("register metrics");

        metrics.scrape("metrics");
        metrics.observe_rpc("system_health", RpcOutcome::Transport, 0.2);
        metrics.group_failed("blocks");

        assert_eq!(
            metrics
                .rpc_requests_total
                .with_label_values(&["system_health", "transport"])
                .get(),
            1
        );
        assert!(!registry.gather().is_empty());
    }

    #[test]
    fn telemetry_registry_gather_text_is_prefixed() {
        let telemetry = TelemetryRegistry::new().expect("create telemetry registry");
        telemetry.exporter.observe_rpc("chain_getHeader", RpcOutcome::Ok, 0.01);
        let text = telemetry.gather_text();
        assert!(text.contains("dotexporter_rpc_request_seconds"));
        assert!(text.contains("method=\"chain_getHeader\""));
    }

    #[tokio::test]
    async fn serves_metrics_over_http() {
        let telemetry = Arc::new(TelemetryRegistry::new().expect("registry"));
        telemetry.exporter.scrape("health");

        // Grab a free port, then hand it to the server.
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = probe.local_addr().unwrap();
        drop(probe);

        tokio::spawn(run_telemetry_http_server(telemetry.clone(), addr));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let body = reqwest::get(format!("http://{addr}/metrics"))
            .await
            .expect("telemetry server should answer")
            .text()
            .await
            .unwrap();
        assert!(body.contains("dotexporter_scrapes_total{endpoint=\"health\"} 1"));

        let status = reqwest::get(format!("http://{addr}/other")).await.unwrap().status();
        assert_eq!(status.as_u16(), 404);
    }
}
