//! Boundary types shared by the pipeline, the aggregation service, and the
//! hosting layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw free-text value plus the number of source rows sharing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawTextBucket {
    /// Raw reaction description as reported.
    pub text: String,
    /// Number of report rows carrying exactly this text.
    pub count: u64,
}

impl RawTextBucket {
    pub fn new(text: impl Into<String>, count: u64) -> Self {
        Self {
            text: text.into(),
            count,
        }
    }
}

/// A canonical (or sentinel) label with its accumulated weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedLabel {
    pub label: String,
    pub count: u64,
}

/// Result envelope of reaction normalization, ready for the hosting layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedReactions {
    pub items: Vec<NormalizedLabel>,
}

/// One row of the external medicine master table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicineRecord {
    pub id: i64,
    /// Brand name field as entered, possibly multi-valued.
    pub brand_name: String,
    /// Generic name field as entered, possibly multi-valued.
    pub generic_name: String,
}

/// Aggregated report count for one canonical medicine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicineCount {
    pub medicine: String,
    pub count: u64,
}

/// Row-source filter for report queries. Empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Inclusive lower bound on report creation time.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on report creation time.
    pub end: Option<DateTime<Utc>>,
    /// Restrict to reports tagged with this canonical medicine.
    pub medicine: Option<String>,
}
