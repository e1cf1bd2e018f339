//! Liveness check behind `/health`.
//!
//! Maps the node's `system_health` answer to an HTTP status:
//!
//! - 502 when the node cannot be queried or omits `peers`/`shouldHavePeers`,
//! - 500 when it has fewer than two peers but expects to have some,
//! - 200 otherwise.

use crate::metrics::Exporter;
use crate::rpc::NodeRpc;
use crate::rpc::types::{SystemHealth, decode};

/// `Origin` header value internal probes send to skip the node query.
pub const DEBUG_PROBE_ORIGIN: &str = "dotexporter";

/// Outcome of a health evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthReport {
    /// Debug probe shortcut; the node was not queried.
    Bypassed,
    Healthy { peers: u64 },
    /// The node expects peers but has fewer than two.
    Isolated { peers: u64 },
    /// `system_health` failed or lacked required fields.
    Unavailable,
}

impl HealthReport {
    pub fn status_code(&self) -> u16 {
        match self {
            HealthReport::Bypassed | HealthReport::Healthy { .. } => 200,
            HealthReport::Isolated { .. } => 500,
            HealthReport::Unavailable => 502,
        }
    }

    pub fn body(&self) -> String {
        match self {
            HealthReport::Bypassed => String::new(),
            HealthReport::Healthy { peers } => format!("OK {peers}\n"),
            HealthReport::Isolated { peers } => {
                format!("system_health: peers {peers}, shouldHavePeers: true\n")
            }
            HealthReport::Unavailable => "node rpc unavailable\n".to_string(),
        }
    }
}

/// Applies the peer rule to a decoded `system_health` result.
pub fn evaluate(health: &SystemHealth) -> HealthReport {
    match (health.peers, health.should_have_peers) {
        (Some(peers), Some(true)) if peers < 2 => HealthReport::Isolated { peers },
        (Some(peers), Some(_)) => HealthReport::Healthy { peers },
        _ => HealthReport::Unavailable,
    }
}

impl<R: NodeRpc> Exporter<R> {
    /// Evaluates node health for one `/health` request.
    ///
    /// `origin` is the request's `Origin` header, if any.
    pub async fn health(&self, origin: Option<&str>) -> HealthReport {
        self.telemetry.scrape("health");

        if self.config.debug && origin == Some(DEBUG_PROBE_ORIGIN) {
            return HealthReport::Bypassed;
        }

        let mut session = self.session();
        let health = match session.query("system_health").await {
            Ok(value) => match decode::<SystemHealth>("system_health", value) {
                Ok(health) => health,
                Err(e) => {
                    tracing::warn!(error = %e, "system_health returned an unexpected shape");
                    return HealthReport::Unavailable;
                }
            },
            // Already logged by the session.
            Err(_) => return HealthReport::Unavailable,
        };

        let report = evaluate(&health);
        if let HealthReport::Isolated { peers } = report {
            tracing::warn!(peers, "node is isolated but expects peers");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::SystemTime;

    use serde_json::json;

    use super::*;
    use crate::config::ExporterConfig;
    use crate::state::ExporterState;
    use crate::telemetry::ExporterMetrics;
    use crate::testing::MockRpc;

    fn exporter(rpc: MockRpc, debug: bool) -> Exporter<MockRpc> {
        let config = ExporterConfig {
            debug,
            ..ExporterConfig::default()
        };
        Exporter::new(
            rpc,
            Arc::new(ExporterState::new(SystemTime::UNIX_EPOCH)),
            config,
            ExporterMetrics::unregistered(),
        )
    }

    fn node(health: serde_json::Value) -> MockRpc {
        MockRpc::new().ok("system_health", health)
    }

    #[tokio::test]
    async fn isolated_node_expecting_peers_is_500() {
        let report = exporter(node(json!({ "peers": 1, "shouldHavePeers": true })), false)
            .health(None)
            .await;
        assert_eq!(report, HealthReport::Isolated { peers: 1 });
        assert_eq!(report.status_code(), 500);
    }

    #[tokio::test]
    async fn isolated_node_not_expecting_peers_is_200() {
        let report = exporter(node(json!({ "peers": 1, "shouldHavePeers": false })), false)
            .health(None)
            .await;
        assert_eq!(report.status_code(), 200);
        assert_eq!(report.body(), "OK 1\n");
    }

    #[tokio::test]
    async fn well_connected_node_is_200() {
        let report = exporter(
            node(json!({ "peers": 12, "shouldHavePeers": true, "isSyncing": false })),
            false,
        )
        .health(None)
        .await;
        assert_eq!(report, HealthReport::Healthy { peers: 12 });
    }

    #[tokio::test]
    async fn unreachable_node_is_502() {
        let report = exporter(MockRpc::new(), false).health(None).await;
        assert_eq!(report.status_code(), 502);
    }

    #[tokio::test]
    async fn missing_fields_are_502() {
        let report = exporter(node(json!({ "peers": 4 })), false).health(None).await;
        assert_eq!(report, HealthReport::Unavailable);

        let report = exporter(node(json!({ "isSyncing": true })), false).health(None).await;
        assert_eq!(report, HealthReport::Unavailable);
    }

    #[tokio::test]
    async fn debug_probe_skips_the_node() {
        let exporter = exporter(MockRpc::new(), true);
        let report = exporter.health(Some(DEBUG_PROBE_ORIGIN)).await;
        assert_eq!(report, HealthReport::Bypassed);
        assert_eq!(report.status_code(), 200);
        assert!(exporter.rpc().called().is_empty());
    }

    #[tokio::test]
    async fn probe_origin_without_debug_queries_the_node() {
        let exporter = exporter(MockRpc::new(), false);
        let report = exporter.health(Some(DEBUG_PROBE_ORIGIN)).await;
        assert_eq!(report.status_code(), 502);
        assert_eq!(exporter.rpc().called(), vec!["system_health".to_string()]);
    }
}
