//! Attribute range filtering with sentinel "unknown" handling.

use serde::{Deserialize, Serialize};

use super::record::{EarthquakeRecord, SENTINEL};

/// Inclusive lower/upper bound pair for one numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub lower: f64,
    pub upper: f64,
}

impl RangeFilter {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Plain inclusive range check, no sentinel handling.
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Range check with the sentinel bypass: an unknown value always passes.
    pub fn passes(&self, value: f64) -> bool {
        value == SENTINEL || self.in_range(value)
    }
}

/// How the year sentinel interacts with the other attribute clauses.
///
/// The source application combined the three range checks as
/// `magOk && depthOk && yearInRange || year == -9999`, so a record with an
/// unknown year bypassed the magnitude and depth checks entirely. That is
/// almost certainly an operator-precedence accident, but some consumers may
/// depend on it, so both behaviors are available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownYearRule {
    /// The sentinel bypass applies to the year clause only.
    #[default]
    BypassYearOnly,
    /// Legacy behavior: an unknown year passes the record unconditionally.
    BypassAll,
}

/// The active magnitude/depth/year filters for a query session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub magnitude: RangeFilter,
    pub depth_km: RangeFilter,
    pub year: RangeFilter,
    #[serde(default)]
    pub unknown_year_rule: UnknownYearRule,
}

impl FilterSet {
    /// Defaults spanning the full US historical dataset; every plausible
    /// record passes until the user narrows a range.
    pub fn permissive() -> Self {
        Self {
            magnitude: RangeFilter::new(0.0, 10.0),
            depth_km: RangeFilter::new(0.0, 800.0),
            year: RangeFilter::new(1568.0, 2010.0),
            unknown_year_rule: UnknownYearRule::default(),
        }
    }

    /// Evaluate one record against all three range filters. Pure.
    pub fn passes(&self, record: &EarthquakeRecord) -> bool {
        let magnitude_ok = self.magnitude.passes(record.magnitude);
        let depth_ok = self.depth_km.passes(record.depth_km);

        match self.unknown_year_rule {
            UnknownYearRule::BypassYearOnly => {
                magnitude_ok && depth_ok && self.year.passes(record.year)
            }
            UnknownYearRule::BypassAll => {
                magnitude_ok && depth_ok && self.year.in_range(record.year)
                    || record.year == SENTINEL
            }
        }
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::permissive()
    }
}
