use std::time::{Duration, SystemTime};

/// Last block number seen for one chain position, and when it was seen.
///
/// `block` never decreases: [`BlockMark::advance`] only replaces the mark
/// (both fields at once) when a strictly higher block is observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockMark {
    pub block: u64,
    pub observed_at: SystemTime,
}

impl BlockMark {
    pub fn new(block: u64, observed_at: SystemTime) -> Self {
        Self { block, observed_at }
    }

    /// Average seconds per block between this mark and `current_block` at `now`.
    ///
    /// With no new block since the mark, returns the raw elapsed seconds so a
    /// stalled chain shows up as a steadily growing value. A clock that moved
    /// backwards counts as zero elapsed time.
    pub fn drift(&self, current_block: u64, now: SystemTime) -> f64 {
        let dt = now
            .duration_since(self.observed_at)
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();

        match current_block.checked_sub(self.block) {
            Some(db) if db > 0 => (dt / db as f64).floor(),
            _ => dt,
        }
    }

    /// Moves the mark forward if `block` is strictly newer. Returns whether it moved.
    pub fn advance(&mut self, block: u64, observed_at: SystemTime) -> bool {
        if block > self.block {
            *self = Self::new(block, observed_at);
            true
        } else {
            false
        }
    }
}
