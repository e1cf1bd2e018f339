//! Scrape orchestration for `/metrics`.
//!
//! One scrape runs these steps in order, with a single timestamp:
//!
//! 1. runtime group: `system_health` + `state_getRuntimeVersion`,
//! 2. blocks group: head and finalized numbers plus their drift,
//! 3. `dot_rpc_healthy` from the session's transport error count,
//! 4. identity refresh when the cache is empty, stale, or the head regressed,
//! 5. mark updates,
//! 6. rendering with identity labels applied.
//!
//! Groups fail independently: a failed group only removes its own lines.

use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

use super::record::{MetricRecord, render};
use crate::config::ExporterConfig;
use crate::error::{DataError, ScrapeError};
use crate::rpc::types::{
    Header, RuntimeVersion, SignedBlock, SystemHealth, decode, label_value, parse_block_number,
};
use crate::rpc::{NodeRpc, ScrapeSession};
use crate::state::{ExporterState, IdentitySpec, MarkKind};
use crate::telemetry::ExporterMetrics;

/// Block numbers seen by the blocks group; zero when the group failed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockObservation {
    pub head: u64,
    pub finalized: u64,
}

/// Scrape driver shared by all request handlers.
///
/// Owns the node client and borrows nothing per request; all cross-request
/// state lives in the shared [`ExporterState`].
pub struct Exporter<R> {
    pub(crate) rpc: R,
    pub(crate) state: Arc<ExporterState>,
    pub(crate) config: ExporterConfig,
    pub(crate) telemetry: ExporterMetrics,
}

impl<R: NodeRpc> Exporter<R> {
    pub fn new(
        rpc: R,
        state: Arc<ExporterState>,
        config: ExporterConfig,
        telemetry: ExporterMetrics,
    ) -> Self {
        Self {
            rpc,
            state,
            config,
            telemetry,
        }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub(crate) fn session(&self) -> ScrapeSession<'_, R> {
        ScrapeSession::new(&self.rpc, &self.telemetry, self.config.debug)
    }

    /// Handles one `/metrics` request at the current wall-clock time.
    pub async fn scrape(&self) -> String {
        self.scrape_at(SystemTime::now()).await
    }

    /// Handles one `/metrics` request with `now` fixed for every drift
    /// computation and mark update in it.
    pub async fn scrape_at(&self, now: SystemTime) -> String {
        self.telemetry.scrape("metrics");
        let mut session = self.session();
        let mut records = Vec::new();

        match runtime_group(&mut session).await {
            Ok(group) => records.extend(group),
            Err(e) => self.group_failed("runtime", &e),
        }

        let observed = match self.blocks_group(&mut session, now).await {
            Ok((group, observed)) => {
                records.extend(group);
                observed
            }
            Err(e) => {
                self.group_failed("blocks", &e);
                BlockObservation::default()
            }
        };

        let healthy = session.transport_errors() == 0;
        records.push(MetricRecord::from_u64("dot_rpc_healthy", u64::from(healthy)));

        if self.state.identity_needs_refresh(observed.head).await {
            self.refresh_identity(&mut session).await;
        }

        self.state
            .advance_marks(observed.head, observed.finalized, now)
            .await;

        records.extend(session.into_latency_records());
        let identity = self.state.identity_labels().await;
        render(&records, &identity)
    }

    /// Head and finalized block numbers with their drift.
    async fn blocks_group(
        &self,
        session: &mut ScrapeSession<'_, R>,
        now: SystemTime,
    ) -> Result<(Vec<MetricRecord>, BlockObservation), ScrapeError> {
        let header: Header = decode("chain_getHeader", session.query("chain_getHeader").await?)?;
        let head = parse_block_number("number", &header.number)?;
        let head_drift = self.state.drift(MarkKind::Head, head, now).await;

        let finalized_hash = session.query("chain_getFinalizedHead").await?;
        if !finalized_hash.is_string() {
            return Err(DataError::WrongShape {
                method: "chain_getFinalizedHead".to_string(),
                detail: format!("expected a block hash string, got {finalized_hash}"),
            }
            .into());
        }
        let block: SignedBlock = decode(
            "chain_getBlock",
            session.call("chain_getBlock", vec![finalized_hash]).await?,
        )?;
        let finalized = parse_block_number("block.header.number", &block.block.header.number)?;
        let finalized_drift = self.state.drift(MarkKind::Finalized, finalized, now).await;

        let records: Vec<MetricRecord> = [
            (MarkKind::Head, head, head_drift),
            (MarkKind::Finalized, finalized, finalized_drift),
        ]
        .into_iter()
        .flat_map(|(kind, number, drift)| {
            [
                MetricRecord::from_u64("dot_chain_block_number", number)
                    .with_label("block", kind.label()),
                MetricRecord::new("dot_chain_block_drift", drift).with_label("block", kind.label()),
            ]
        })
        .collect();

        Ok((records, BlockObservation { head, finalized }))
    }

    /// Re-fetches node identity; on failure the cache is left as it was.
    pub(crate) async fn refresh_identity(&self, session: &mut ScrapeSession<'_, R>) {
        match fetch_identity(session).await {
            Ok(spec) => {
                let spec = spec.with_version_files(&self.config.version_files);
                tracing::info!(
                    name = %spec.name,
                    version = %spec.version,
                    chain = %spec.chain,
                    "node identity refreshed"
                );
                self.state.install_identity(spec).await;
            }
            Err(e) => self.group_failed("identity", &e),
        }
    }

    pub(crate) fn group_failed(&self, group: &'static str, error: &ScrapeError) {
        tracing::warn!(group, error = %error, "scrape group failed");
        self.telemetry.group_failed(group);
    }
}

/// Peer count, sync flags and runtime spec version.
async fn runtime_group<R: NodeRpc>(
    session: &mut ScrapeSession<'_, R>,
) -> Result<Vec<MetricRecord>, ScrapeError> {
    let health: SystemHealth = decode("system_health", session.query("system_health").await?)?;
    let runtime: RuntimeVersion = decode(
        "state_getRuntimeVersion",
        session.query("state_getRuntimeVersion").await?,
    )?;

    let missing = |field| DataError::MissingField {
        method: "system_health".to_string(),
        field,
    };
    let peers = health.peers.ok_or_else(|| missing("peers"))?;
    let should_have_peers = health
        .should_have_peers
        .ok_or_else(|| missing("shouldHavePeers"))?;
    let is_syncing = health.is_syncing.ok_or_else(|| missing("isSyncing"))?;

    Ok(vec![
        MetricRecord::from_u64("dot_peer_count", peers),
        MetricRecord::from_u64("dot_shouldHavePeers", u64::from(should_have_peers)),
        MetricRecord::from_u64("dot_isSyncing", u64::from(is_syncing)),
        MetricRecord::from_u64("dot_specVersion", runtime.spec_version),
    ])
}

/// `system_name`, `system_version` and `system_chain`; all three or nothing.
async fn fetch_identity<R: NodeRpc>(
    session: &mut ScrapeSession<'_, R>,
) -> Result<IdentitySpec, ScrapeError> {
    let mut fields: Vec<String> = Vec::with_capacity(3);
    for method in ["system_name", "system_version", "system_chain"] {
        let value: Value = session.query(method).await?;
        fields.push(label_value(method, value)?);
    }
    let mut fields = fields.into_iter();
    Ok(IdentitySpec {
        name: fields.next().unwrap_or_default(),
        version: fields.next().unwrap_or_default(),
        chain: fields.next().unwrap_or_default(),
        build: None,
        substrate_ref: None,
    })
}
