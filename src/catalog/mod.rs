//! Earthquake catalog loading.
//!
//! Reads the headered CSV export of the original shapefile dataset. Header
//! matching is case-insensitive and accepts the legacy `LATITIUDE`
//! misspelling the shapefile shipped with. Rows without usable coordinates
//! are skipped with a warning; unparseable attribute fields degrade to the
//! unknown sentinel instead of failing the load.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;
use tracing::{info, warn};

use crate::error::QueryError;
use crate::models::{EarthquakeRecord, SENTINEL};

/// The full ordered record set, immutable after load.
pub struct EarthquakeCatalog {
    records: Vec<Arc<EarthquakeRecord>>,
}

/// Column positions resolved from the CSV header row.
struct ColumnMap {
    id: Option<usize>,
    longitude: usize,
    latitude: usize,
    magnitude: Option<usize>,
    depth_km: Option<usize>,
    year: Option<usize>,
    location: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            by_name.insert(name.trim().to_lowercase(), i);
        }

        let find = |names: &[&str]| names.iter().find_map(|n| by_name.get(*n).copied());

        let longitude = find(&["longitude"]).context("catalog is missing a LONGITUDE column")?;
        // "latitiude" is the misspelling carried by the source shapefile.
        let latitude =
            find(&["latitude", "latitiude"]).context("catalog is missing a LATITUDE column")?;

        Ok(Self {
            id: find(&["id"]),
            longitude,
            latitude,
            magnitude: find(&["magnitude"]),
            depth_km: find(&["depth_km"]),
            year: find(&["year"]),
            location: find(&["location"]),
        })
    }
}

impl EarthquakeCatalog {
    /// Load a catalog from a headered CSV file.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open catalog {}", path.display()))?;

        let headers = reader.headers().context("failed to read catalog header")?;
        let columns = ColumnMap::resolve(headers)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut degraded: HashMap<&'static str, usize> = HashMap::new();

        for (ordinal, row) in reader.records().enumerate() {
            let row = row.context("failed to read catalog row")?;
            let line = ordinal as u64 + 2; // header is line 1

            match parse_row(&row, &columns, ordinal as u32 + 1, line, &mut degraded) {
                Ok(record) => records.push(Arc::new(record)),
                Err(e) => {
                    warn!("Skipping {}", e);
                    skipped += 1;
                }
            }
        }

        if records.is_empty() {
            bail!("catalog {} contains no usable records", path.display());
        }

        info!(
            "Loaded {} earthquake records from {} ({} skipped)",
            records.len(),
            path.display(),
            skipped
        );
        for (column, count) in &degraded {
            info!("  {} unparseable {} values treated as unknown", count, column);
        }

        Ok(Self { records })
    }

    /// Build a catalog from already-parsed records. Used by embedders that
    /// load from something other than CSV.
    pub fn from_records(records: Vec<EarthquakeRecord>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    /// Records in natural load order.
    pub fn records(&self) -> &[Arc<EarthquakeRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_row(
    row: &csv::StringRecord,
    columns: &ColumnMap,
    ordinal: u32,
    line: u64,
    degraded: &mut HashMap<&'static str, usize>,
) -> Result<EarthquakeRecord, QueryError> {
    let coordinate = |idx: usize, name: &str| -> Result<f64, QueryError> {
        row.get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| QueryError::MalformedRecord {
                line,
                reason: format!("unusable {} value", name),
            })
    };

    let longitude = coordinate(columns.longitude, "longitude")?;
    let latitude = coordinate(columns.latitude, "latitude")?;

    let mut attribute = |idx: Option<usize>, name: &'static str| -> f64 {
        let raw = idx.and_then(|i| row.get(i)).map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return SENTINEL;
        }
        match raw.parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                *degraded.entry(name).or_insert(0) += 1;
                SENTINEL
            }
        }
    };

    let magnitude = attribute(columns.magnitude, "magnitude");
    let depth_km = attribute(columns.depth_km, "depth_km");
    let year = attribute(columns.year, "year");

    let id = columns
        .id
        .and_then(|i| row.get(i))
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(ordinal);

    let location = columns
        .location
        .and_then(|i| row.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    Ok(EarthquakeRecord {
        id,
        longitude,
        latitude,
        magnitude,
        depth_km,
        year,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_catalog(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_basic_catalog() {
        let file = write_catalog(
            "ID,MAGNITUDE,DEPTH_KM,YEAR,LONGITUDE,LATITIUDE,LOCATION\n\
             7,4.0,10,2000,-120.5,36.2,Central California\n\
             9,-9999,33,1998,-118.1,34.0,Southern California\n",
        );

        let catalog = EarthquakeCatalog::load_csv(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = &catalog.records()[0];
        assert_eq!(first.id, 7);
        assert_eq!(first.magnitude, 4.0);
        assert_eq!(first.latitude, 36.2);
        assert_eq!(first.location, "Central California");

        assert_eq!(catalog.records()[1].magnitude, SENTINEL);
    }

    #[test]
    fn test_bad_coordinates_skip_row() {
        let file = write_catalog(
            "MAGNITUDE,DEPTH_KM,YEAR,LONGITUDE,LATITUDE,LOCATION\n\
             4.0,10,2000,not-a-number,36.2,Bad\n\
             5.1,20,1995,-121.0,37.5,Good\n",
        );

        let catalog = EarthquakeCatalog::load_csv(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].location, "Good");
    }

    #[test]
    fn test_bad_attributes_degrade_to_sentinel() {
        let file = write_catalog(
            "MAGNITUDE,DEPTH_KM,YEAR,LONGITUDE,LATITUDE,LOCATION\n\
             n/a,,1906,-122.4,37.8,San Francisco\n",
        );

        let catalog = EarthquakeCatalog::load_csv(file.path()).unwrap();
        let record = &catalog.records()[0];
        assert_eq!(record.magnitude, SENTINEL);
        assert_eq!(record.depth_km, SENTINEL);
        assert_eq!(record.year, 1906.0);
        // No id column: ordinal assigned.
        assert_eq!(record.id, 1);
    }

    #[test]
    fn test_missing_coordinate_column_fails() {
        let file = write_catalog("MAGNITUDE,YEAR\n4.0,2000\n");
        assert!(EarthquakeCatalog::load_csv(file.path()).is_err());
    }
}
