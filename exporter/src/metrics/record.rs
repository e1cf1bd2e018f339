//! Metric records and Prometheus text rendering.
//!
//! Scrape output is built from plain [`MetricRecord`]s rather than a
//! `prometheus::Registry`: label sets differ per request (identity labels
//! can change at any scrape) and lines must come out in emission order.

use std::fmt::Write as _;

/// One sample line: `name{labels} value`.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    /// Record-specific labels, in insertion order.
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>, value: impl Into<f64>) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            value: value.into(),
        }
    }

    /// Builds a record from an integer counter/gauge reading.
    pub fn from_u64(name: impl Into<String>, value: u64) -> Self {
        Self::new(name, value as f64)
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Merges identity labels with a record's own labels.
///
/// Identity keys come first in their given order; a record label with the
/// same key overrides the identity value in place, other record labels are
/// appended.
pub fn merge_labels<'a>(
    identity: &'a [(&'static str, String)],
    own: &'a [(String, String)],
) -> Vec<(&'a str, &'a str)> {
    let mut merged: Vec<(&str, &str)> = identity
        .iter()
        .map(|(k, v)| (*k, v.as_str()))
        .collect();

    for (key, value) in own {
        match merged.iter_mut().find(|(k, _)| *k == key.as_str()) {
            Some(slot) => slot.1 = value.as_str(),
            None => merged.push((key.as_str(), value.as_str())),
        }
    }
    merged
}

fn escape_label_value(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}

/// Renders records in order, one line each, with identity labels applied.
pub fn render(records: &[MetricRecord], identity: &[(&'static str, String)]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.name);

        let labels = merge_labels(identity, &record.labels);
        if !labels.is_empty() {
            out.push('{');
            for (i, (key, value)) in labels.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(key);
                out.push_str("=\"");
                escape_label_value(value, &mut out);
                out.push('"');
            }
            out.push('}');
        }

        // Writing into a String cannot fail.
        let _ = writeln!(out, " {}", record.value);
    }
    out
}
