//! Shared application state.

use std::sync::Arc;

use dot_exporter::DefaultExporter;

/// State shared by all request handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Scrape driver; owns the node client and the process-wide marks and
    /// identity cache.
    pub exporter: DefaultExporter,
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
