//! Spatial index over the earthquake catalog.

use hashbrown::HashSet;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use super::track::TrackSet;
use crate::models::EarthquakeRecord;

/// Wrapper for R-tree indexing of catalog records.
#[derive(Clone)]
struct IndexedRecord {
    /// Position in the catalog's natural load order.
    ordinal: usize,
    record: Arc<EarthquakeRecord>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRecord {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Point-in-polygon index over a fixed record set.
///
/// The R-tree narrows candidates to the track's dilated bounding box; exact
/// containment then uses the even-odd test. Results always come back in the
/// catalog's natural order, so the index is observably identical to the
/// plain linear scan.
pub struct RecordSpatialIndex {
    records: Vec<Arc<EarthquakeRecord>>,
    tree: RTree<IndexedRecord>,
}

impl RecordSpatialIndex {
    /// Build the index from the full ordered record set.
    pub fn build(records: Vec<Arc<EarthquakeRecord>>) -> Self {
        let indexed: Vec<IndexedRecord> = records
            .iter()
            .enumerate()
            .map(|(ordinal, record)| IndexedRecord {
                ordinal,
                record: Arc::clone(record),
                envelope: AABB::from_point([record.longitude, record.latitude]),
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} records", tree.size());

        Self { records, tree }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All indexed records in natural order.
    pub fn records(&self) -> &[Arc<EarthquakeRecord>] {
        &self.records
    }

    /// Find all records inside the track set, in catalog order.
    pub fn query_within(&self, tracks: &TrackSet, tolerance: f64) -> Vec<Arc<EarthquakeRecord>> {
        if tracks.is_empty() {
            return Vec::new();
        }

        let mut hits: HashSet<usize> = HashSet::new();

        for track in tracks.tracks() {
            if track.is_degenerate() {
                continue;
            }
            let Some((min_x, min_y, max_x, max_y)) = track.bbox() else {
                continue;
            };

            let envelope = AABB::from_corners(
                [min_x - tolerance, min_y - tolerance],
                [max_x + tolerance, max_y + tolerance],
            );

            for entry in self.tree.locate_in_envelope_intersecting(&envelope) {
                if hits.contains(&entry.ordinal) {
                    continue;
                }
                if track.contains(entry.record.longitude, entry.record.latitude, tolerance) {
                    hits.insert(entry.ordinal);
                }
            }
        }

        let mut ordinals: Vec<usize> = hits.into_iter().collect();
        ordinals.sort_unstable();
        ordinals
            .into_iter()
            .map(|i| Arc::clone(&self.records[i]))
            .collect()
    }

    /// Linear-scan reference path; same observable results as
    /// [`query_within`](Self::query_within).
    pub fn query_within_scan(
        &self,
        tracks: &TrackSet,
        tolerance: f64,
    ) -> Vec<Arc<EarthquakeRecord>> {
        if tracks.is_empty() {
            return Vec::new();
        }

        self.records
            .iter()
            .filter(|r| tracks.contains(r.longitude, r.latitude, tolerance))
            .map(Arc::clone)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SENTINEL;
    use crate::pip::track::{Track, DEFAULT_BOUNDARY_TOLERANCE};

    fn record(id: u32, x: f64, y: f64) -> Arc<EarthquakeRecord> {
        Arc::new(EarthquakeRecord {
            id,
            longitude: x,
            latitude: y,
            magnitude: SENTINEL,
            depth_km: SENTINEL,
            year: SENTINEL,
            location: String::new(),
        })
    }

    fn sample_index() -> RecordSpatialIndex {
        RecordSpatialIndex::build(vec![
            record(1, 5.0, 5.0),
            record(2, 15.0, 15.0),
            record(3, 2.0, 8.0),
            record(4, 9.9, 0.1),
            record(5, -3.0, 4.0),
        ])
    }

    fn square() -> TrackSet {
        let mut set = TrackSet::new();
        set.push(Track::rect(0.0, 0.0, 10.0, 10.0).unwrap());
        set
    }

    #[test]
    fn test_query_returns_inside_records_in_order() {
        let index = sample_index();
        let results = index.query_within(&square(), DEFAULT_BOUNDARY_TOLERANCE);
        let ids: Vec<u32> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_empty_track_set_yields_empty() {
        let index = sample_index();
        assert!(index
            .query_within(&TrackSet::new(), DEFAULT_BOUNDARY_TOLERANCE)
            .is_empty());
    }

    #[test]
    fn test_tree_and_scan_paths_agree() {
        let index = sample_index();

        let mut tracks = square();
        tracks.push(Track::rect(-5.0, 0.0, -1.0, 5.0).unwrap());

        let tree_ids: Vec<u32> = index
            .query_within(&tracks, DEFAULT_BOUNDARY_TOLERANCE)
            .iter()
            .map(|r| r.id)
            .collect();
        let scan_ids: Vec<u32> = index
            .query_within_scan(&tracks, DEFAULT_BOUNDARY_TOLERANCE)
            .iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(tree_ids, scan_ids);
        assert_eq!(tree_ids, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_overlapping_tracks_deduplicate() {
        let index = sample_index();

        let mut tracks = square();
        tracks.push(Track::rect(4.0, 4.0, 6.0, 6.0).unwrap());

        let ids: Vec<u32> = index
            .query_within(&tracks, DEFAULT_BOUNDARY_TOLERANCE)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_results_are_subset_of_catalog() {
        let index = sample_index();
        let results = index.query_within(&square(), DEFAULT_BOUNDARY_TOLERANCE);
        for r in &results {
            assert!(index.records().iter().any(|c| c.id == r.id));
        }
    }
}
