//! Exporter library crate.
//!
//! This crate turns a Substrate/Polkadot node's JSON-RPC endpoint into
//! Prometheus text on demand:
//!
//! - node RPC access and per-scrape bookkeeping (`rpc`),
//! - head/finalized block marks and the identity cache (`state`),
//! - scrape orchestration, BABE authorship and text rendering (`metrics`),
//! - the `/health` evaluation (`health`),
//! - the exporter's own Prometheus telemetry (`telemetry`),
//! - and top-level configuration (`config`).
//!
//! The HTTP surface lives in the gateway binary; everything here is
//! transport-agnostic apart from the node client itself.

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod rpc;
pub mod state;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level configuration types.
pub use config::{ExporterConfig, RpcClientConfig, TelemetryConfig, VersionFilesConfig};

pub use error::{DataError, ScrapeError};
pub use health::{DEBUG_PROBE_ORIGIN, HealthReport};
pub use metrics::{Exporter, MetricRecord};
pub use rpc::{HttpNodeRpc, NodeRpc, RpcError};
pub use state::{BlockMark, ExporterState, IdentitySpec, IdentityState, MarkKind};
pub use telemetry::{ExporterMetrics, TelemetryRegistry, run_telemetry_http_server};

/// Exporter wired to the production HTTP node client.
pub type DefaultExporter = Exporter<HttpNodeRpc>;
