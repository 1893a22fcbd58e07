//! Presentation rows for query results.
//!
//! Pure, serializable view of a result set for any sink (table UI, CLI,
//! JSON). Formatting matches the original application's result list:
//! sentinel attributes render as `Unknown`, coordinates with two decimals.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::models::{EarthquakeRecord, SENTINEL};

/// One formatted result line.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub year: String,
    pub longitude: String,
    pub latitude: String,
    pub depth_km: String,
    pub magnitude: String,
    pub location: String,
}

impl ResultRow {
    pub fn from_record(record: &EarthquakeRecord) -> Self {
        Self {
            year: format_attribute(record.year),
            longitude: format!("{:.2}", record.longitude),
            latitude: format!("{:.2}", record.latitude),
            depth_km: format_attribute(record.depth_km),
            magnitude: format_attribute(record.magnitude),
            location: record.location.clone(),
        }
    }
}

impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Year: {}. At: Lon: {}, Lat: {}. Depth: {}. Magnitude: {}.",
            self.year, self.longitude, self.latitude, self.depth_km, self.magnitude
        )
    }
}

/// A formatted result set with its section header.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub summary: String,
    pub rows: Vec<ResultRow>,
}

impl QueryReport {
    pub fn new(result: &[Arc<EarthquakeRecord>]) -> Self {
        Self {
            summary: format!("Queried Count: {}", result.len()),
            rows: result.iter().map(|r| ResultRow::from_record(r)).collect(),
        }
    }
}

fn format_attribute(value: f64) -> String {
    if value == SENTINEL {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}
