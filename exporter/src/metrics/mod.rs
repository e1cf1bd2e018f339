//! Node metrics served to Prometheus.
//!
//! - [`record`]: the [`MetricRecord`] line model and text rendering,
//! - [`aggregator`]: the [`Exporter`] and the `/metrics` scrape,
//! - [`babe`]: the `/babeauthorship` collector.

pub mod aggregator;
pub mod babe;
pub mod record;

pub use aggregator::{BlockObservation, Exporter};
pub use record::{MetricRecord, merge_labels, render};
