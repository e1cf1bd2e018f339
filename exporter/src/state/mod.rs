//! Process-wide exporter state.
//!
//! Two [`BlockMark`]s (head and finalized) and the [`IdentityState`] cache
//! are the only values that survive between requests. They live in one
//! [`ExporterState`] constructed at startup and shared by reference; every
//! read-compare-update happens under its locks, and no lock is ever held
//! across a node RPC call.

use std::time::SystemTime;

use tokio::sync::Mutex;

pub mod identity;
pub mod mark;

pub use identity::{IdentitySpec, IdentityState};
pub use mark::BlockMark;

/// Which chain position a mark tracks. Doubles as the `block` label value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkKind {
    Head,
    Finalized,
}

impl MarkKind {
    pub fn label(self) -> &'static str {
        match self {
            MarkKind::Head => "head",
            MarkKind::Finalized => "finalized",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ChainMarks {
    head: BlockMark,
    finalized: BlockMark,
}

impl ChainMarks {
    fn get(&self, kind: MarkKind) -> &BlockMark {
        match kind {
            MarkKind::Head => &self.head,
            MarkKind::Finalized => &self.finalized,
        }
    }

    fn get_mut(&mut self, kind: MarkKind) -> &mut BlockMark {
        match kind {
            MarkKind::Head => &mut self.head,
            MarkKind::Finalized => &mut self.finalized,
        }
    }
}

/// Shared mutable state for all concurrent scrapes.
pub struct ExporterState {
    marks: Mutex<ChainMarks>,
    identity: Mutex<IdentityState>,
}

impl ExporterState {
    /// Both marks start at block 0, observed at `started_at`.
    ///
    /// Drift reported by the first scrape is measured against that
    /// placeholder and carries no information (usually 0); drift becomes
    /// meaningful once a real block has been recorded.
    pub fn new(started_at: SystemTime) -> Self {
        let zero = BlockMark::new(0, started_at);
        Self {
            marks: Mutex::new(ChainMarks {
                head: zero,
                finalized: zero,
            }),
            identity: Mutex::new(IdentityState::default()),
        }
    }

    pub async fn mark(&self, kind: MarkKind) -> BlockMark {
        *self.marks.lock().await.get(kind)
    }

    /// Drift of `current_block` relative to the stored mark, at `now`.
    pub async fn drift(&self, kind: MarkKind, current_block: u64, now: SystemTime) -> f64 {
        self.marks.lock().await.get(kind).drift(current_block, now)
    }

    /// Applies the mark update policy to both marks under one lock.
    pub async fn advance_marks(&self, head: u64, finalized: u64, now: SystemTime) {
        let mut marks = self.marks.lock().await;
        if marks.get_mut(MarkKind::Head).advance(head, now) {
            tracing::debug!(block = head, "head mark advanced");
        }
        if marks.get_mut(MarkKind::Finalized).advance(finalized, now) {
            tracing::debug!(block = finalized, "finalized mark advanced");
        }
    }

    /// Decides whether this scrape must refresh the identity cache.
    ///
    /// An observed head below the stored head mark demotes a populated
    /// cache to stale before answering.
    pub async fn identity_needs_refresh(&self, observed_head: u64) -> bool {
        let stored_head = self.marks.lock().await.head.block;
        let mut identity = self.identity.lock().await;
        if observed_head < stored_head && !identity.is_empty() {
            tracing::info!(
                observed_head,
                stored_head,
                "head block regressed, invalidating node identity"
            );
            identity.invalidate();
        }
        identity.needs_refresh()
    }

    pub async fn identity_is_empty(&self) -> bool {
        self.identity.lock().await.is_empty()
    }

    pub async fn install_identity(&self, spec: IdentitySpec) {
        self.identity.lock().await.populate(spec);
    }

    /// Current identity labels, empty while uninitialized.
    pub async fn identity_labels(&self) -> Vec<(&'static str, String)> {
        self.identity
            .lock()
            .await
            .spec()
            .map(IdentitySpec::labels)
            .unwrap_or_default()
    }

    pub async fn identity(&self) -> IdentityState {
        self.identity.lock().await.clone()
    }
}
