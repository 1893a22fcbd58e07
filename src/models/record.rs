use serde::{Deserialize, Serialize};

/// Magic number used by the source dataset to mark a numeric attribute
/// as unknown or not applicable.
pub const SENTINEL: f64 = -9999.0;

/// A single earthquake observation from the catalog.
///
/// Coordinates are planar `(x, y)` in whatever projection the catalog was
/// delivered in; the engine never re-projects. Attribute fields may carry
/// [`SENTINEL`] when the source row had no usable value. Records are built
/// once at load time and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakeRecord {
    pub id: u32,
    pub longitude: f64,
    pub latitude: f64,
    pub magnitude: f64,
    pub depth_km: f64,
    pub year: f64,
    pub location: String,
}

impl EarthquakeRecord {
    /// Whether an attribute value is the unknown sentinel.
    pub fn is_unknown(value: f64) -> bool {
        value == SENTINEL
    }

    /// Attribute value as `Some` when known, `None` when sentinel.
    pub fn known(value: f64) -> Option<f64> {
        if Self::is_unknown(value) {
            None
        } else {
            Some(value)
        }
    }
}
