//! `/babeauthorship`: slots claimed by each validator in the current epoch.

use super::aggregator::Exporter;
use super::record::{MetricRecord, render};
use crate::error::ScrapeError;
use crate::rpc::NodeRpc;
use crate::rpc::types::{EpochAuthorshipMap, decode};

impl<R: NodeRpc> Exporter<R> {
    /// One series per (address, slot), valued at the slot's estimated
    /// wall-clock time. Any failure fails the whole request.
    pub async fn babe_authorship(&self) -> Result<String, ScrapeError> {
        self.telemetry.scrape("babeauthorship");
        let mut session = self.session();

        if self.state.identity_is_empty().await {
            self.refresh_identity(&mut session).await;
        }

        let authorship: EpochAuthorshipMap = decode(
            "babe_epochAuthorship",
            session.query("babe_epochAuthorship").await?,
        )?;
        let records = authorship_records(&authorship, self.config.block_time_secs);

        let identity = self.state.identity_labels().await;
        Ok(render(&records, &identity))
    }
}

fn authorship_records(authorship: &EpochAuthorshipMap, block_time_secs: u64) -> Vec<MetricRecord> {
    let mut records = Vec::new();
    for (address, slots) in authorship.iter() {
        let kinds = [
            ("dot_chain_babe_authorship_primary", &slots.primary),
            ("dot_chain_babe_authorship_secondary", &slots.secondary),
        ];
        for (name, slots) in kinds {
            for &slot in slots {
                records.push(
                    MetricRecord::from_u64(name, slot.saturating_mul(block_time_secs))
                        .with_label("address", address)
                        .with_label("slot", slot.to_string()),
                );
            }
        }
    }
    records
}
