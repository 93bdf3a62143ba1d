use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw extracted row: cell values keyed by header name. Cells that were
/// empty or unreadable in the source are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

/// One cleaned blowdown test measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub volume_type: String,
    /// Valve size in inches, always positive and finite.
    pub valve_size_in: f64,
    /// Blowdown duration in seconds, always positive and finite.
    pub duration_s: f64,
    /// Released gas volume in MCF, always non-negative and finite.
    pub release_mcf: f64,
}

/// Source column headers for the four fields a measurement needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub volume_type: String,
    pub valve_size: String,
    pub duration: String,
    pub release: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            volume_type: "Volume Type".to_string(),
            valve_size: "Valve Size [in]".to_string(),
            duration: "Duration [s]".to_string(),
            release: "Release [MCF]".to_string(),
        }
    }
}

/// Immutable in-memory table of cleaned measurements, built once at
/// startup by the load stage and queried for the rest of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementTable {
    records: Vec<Measurement>,
}

impl MeasurementTable {
    pub fn new(records: Vec<Measurement>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique volume types in first-seen order. Drives the selector.
    pub fn volume_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.volume_type.as_str()) {
                seen.push(record.volume_type.as_str());
            }
        }
        seen
    }

    /// Records whose volume type matches exactly (case-sensitive), in
    /// original load order.
    pub fn filter_by_type(&self, volume_type: &str) -> Vec<&Measurement> {
        self.records
            .iter()
            .filter(|r| r.volume_type == volume_type)
            .collect()
    }
}

/// Outcome of the transform stage: cleaned measurements plus per-reason
/// drop counts for the rows that did not survive.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub measurements: Vec<Measurement>,
    pub dropped_missing: usize,
    pub dropped_non_numeric: usize,
    pub dropped_out_of_domain: usize,
}

impl TransformResult {
    pub fn dropped_total(&self) -> usize {
        self.dropped_missing + self.dropped_non_numeric + self.dropped_out_of_domain
    }
}
