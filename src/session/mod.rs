//! Query session: combines spatial containment and attribute filtering.
//!
//! Replaces the original application's static global holder with an
//! explicit session object. The session owns the track set, the active
//! filters, and the current result; every recomputation fully rebuilds the
//! result, never merges into it.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::catalog::EarthquakeCatalog;
use crate::models::{EarthquakeRecord, FilterSet};
use crate::pip::{RecordSpatialIndex, Track, TrackSet, DEFAULT_BOUNDARY_TOLERANCE};

/// Ordered records currently passing both the spatial and attribute tests.
pub type QueryResult = Vec<Arc<EarthquakeRecord>>;

/// Lifecycle phase of a query session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No track drawn; no result.
    #[default]
    Empty,
    /// At least one completed track, query not yet run.
    HasTrack,
    /// A result has been computed for the current tracks and filters.
    HasResult,
}

#[derive(Default)]
struct SessionState {
    tracks: TrackSet,
    filters: FilterSet,
    /// Records inside the current track set, cached so filter changes only
    /// re-run the attribute step.
    spatial_hits: Vec<Arc<EarthquakeRecord>>,
    result: QueryResult,
    phase: SessionPhase,
}

/// One interactive query session over an immutable catalog.
///
/// Shareable across threads; interior state is behind a lock so result
/// replacement is an atomic swap. Queries themselves are synchronous; a
/// caller that wants background execution wraps the call in its own task.
pub struct QuerySession {
    index: RecordSpatialIndex,
    tolerance: f64,
    state: RwLock<SessionState>,
}

impl QuerySession {
    /// Create a session with the default boundary tolerance and permissive
    /// filters.
    pub fn new(catalog: &EarthquakeCatalog) -> Self {
        Self::with_settings(catalog, DEFAULT_BOUNDARY_TOLERANCE, FilterSet::permissive())
    }

    /// Create a session with explicit tolerance and starting filters.
    pub fn with_settings(catalog: &EarthquakeCatalog, tolerance: f64, filters: FilterSet) -> Self {
        let index = RecordSpatialIndex::build(catalog.records().to_vec());
        Self {
            index,
            tolerance,
            state: RwLock::new(SessionState {
                filters,
                ..SessionState::default()
            }),
        }
    }

    /// Add a completed track to the selection shape and refresh the cached
    /// spatial hits. If a result already exists it is recomputed in place.
    pub fn add_track(&self, track: Track) {
        let mut state = self.state.write();
        state.tracks.push(track);
        state.spatial_hits = self.index.query_within(&state.tracks, self.tolerance);
        debug!(
            "Track added: {} tracks, {} spatial hits",
            state.tracks.len(),
            state.spatial_hits.len()
        );

        match state.phase {
            SessionPhase::HasResult => {
                state.result = apply_filters(&state.spatial_hits, &state.filters);
            }
            _ => state.phase = SessionPhase::HasTrack,
        }
    }

    /// Run the full query and atomically replace the session result.
    ///
    /// With no tracks drawn the result is empty and the session stays
    /// `Empty`. Deterministic: identical inputs yield identical results in
    /// identical order.
    pub fn run_query(&self) -> QueryResult {
        let mut state = self.state.write();

        if state.tracks.is_empty() {
            state.result = Vec::new();
            state.phase = SessionPhase::Empty;
            return Vec::new();
        }

        let result = apply_filters(&state.spatial_hits, &state.filters);
        debug!(
            "Query: {} spatial hits, {} after attribute filters",
            state.spatial_hits.len(),
            result.len()
        );

        state.result = result.clone();
        state.phase = SessionPhase::HasResult;
        result
    }

    /// Replace the active filters. When a result exists, only the attribute
    /// step re-runs over the cached spatial hits; the outcome is identical
    /// to a full recompute.
    pub fn set_filters(&self, filters: FilterSet) {
        let mut state = self.state.write();
        state.filters = filters;
        if state.phase == SessionPhase::HasResult {
            state.result = apply_filters(&state.spatial_hits, &state.filters);
        }
    }

    /// Reset tracks and result together; the session returns to `Empty`.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let filters = state.filters;
        *state = SessionState {
            filters,
            ..SessionState::default()
        };
    }

    /// Snapshot of the current result.
    pub fn result(&self) -> QueryResult {
        self.state.read().result.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    pub fn filters(&self) -> FilterSet {
        self.state.read().filters
    }

    pub fn track_count(&self) -> usize {
        self.state.read().tracks.len()
    }

    pub fn catalog_size(&self) -> usize {
        self.index.len()
    }
}

/// Attribute step: keep spatial hits passing all range filters, preserving
/// order.
fn apply_filters(hits: &[Arc<EarthquakeRecord>], filters: &FilterSet) -> QueryResult {
    hits.iter()
        .filter(|r| filters.passes(r))
        .map(Arc::clone)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RangeFilter, UnknownYearRule, SENTINEL};

    fn record(
        id: u32,
        x: f64,
        y: f64,
        magnitude: f64,
        depth_km: f64,
        year: f64,
    ) -> EarthquakeRecord {
        EarthquakeRecord {
            id,
            longitude: x,
            latitude: y,
            magnitude,
            depth_km,
            year,
            location: String::new(),
        }
    }

    fn filters() -> FilterSet {
        FilterSet {
            magnitude: RangeFilter::new(3.0, 5.0),
            depth_km: RangeFilter::new(0.0, 20.0),
            year: RangeFilter::new(1990.0, 2010.0),
            unknown_year_rule: UnknownYearRule::BypassYearOnly,
        }
    }

    fn square_track() -> Track {
        Track::rect(0.0, 0.0, 10.0, 10.0).unwrap()
    }

    #[test]
    fn test_inside_record_passing_filters_included() {
        let catalog =
            EarthquakeCatalog::from_records(vec![record(1, 5.0, 5.0, 4.0, 10.0, 2000.0)]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        let result = session.run_query();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
        assert_eq!(session.phase(), SessionPhase::HasResult);
    }

    #[test]
    fn test_outside_record_excluded_regardless_of_filters() {
        let catalog =
            EarthquakeCatalog::from_records(vec![record(1, 15.0, 15.0, 4.0, 10.0, 2000.0)]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        assert!(session.run_query().is_empty());
    }

    #[test]
    fn test_sentinel_magnitude_bypasses_magnitude_filter() {
        let catalog =
            EarthquakeCatalog::from_records(vec![record(1, 5.0, 5.0, SENTINEL, 10.0, 2000.0)]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        assert_eq!(session.run_query().len(), 1);
    }

    #[test]
    fn test_no_track_yields_empty_result() {
        let catalog =
            EarthquakeCatalog::from_records(vec![record(1, 5.0, 5.0, 4.0, 10.0, 2000.0)]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        assert!(session.run_query().is_empty());
        assert_eq!(session.phase(), SessionPhase::Empty);
    }

    #[test]
    fn test_clear_resets_tracks_and_result_together() {
        let catalog =
            EarthquakeCatalog::from_records(vec![record(1, 5.0, 5.0, 4.0, 10.0, 2000.0)]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        session.run_query();
        assert_eq!(session.phase(), SessionPhase::HasResult);

        session.clear();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert!(session.result().is_empty());
        assert_eq!(session.track_count(), 0);
        // Filters survive a clear.
        assert_eq!(session.filters(), filters());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let catalog = EarthquakeCatalog::from_records(vec![
            record(1, 5.0, 5.0, 4.0, 10.0, 2000.0),
            record(2, 2.0, 8.0, 3.5, 5.0, 1995.0),
            record(3, 9.0, 1.0, 4.9, 15.0, 2005.0),
        ]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        let first = session.run_query();
        let second = session.run_query();

        let ids = |r: &QueryResult| r.iter().map(|x| x.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_change_recomputes_over_cached_hits() {
        let catalog = EarthquakeCatalog::from_records(vec![
            record(1, 5.0, 5.0, 4.0, 10.0, 2000.0),
            record(2, 2.0, 8.0, 7.5, 5.0, 1995.0),
        ]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        session.run_query();
        assert_eq!(session.result().len(), 1);

        let mut widened = filters();
        widened.magnitude = RangeFilter::new(0.0, 10.0);
        session.set_filters(widened);

        // Recomputed in place without another run_query call.
        assert_eq!(session.result().len(), 2);
        assert_eq!(session.phase(), SessionPhase::HasResult);
    }

    #[test]
    fn test_second_track_extends_selection() {
        let catalog = EarthquakeCatalog::from_records(vec![
            record(1, 5.0, 5.0, 4.0, 10.0, 2000.0),
            record(2, 25.0, 25.0, 4.0, 10.0, 2000.0),
        ]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        session.add_track(square_track());
        assert_eq!(session.run_query().len(), 1);

        session.add_track(Track::rect(20.0, 20.0, 30.0, 30.0).unwrap());
        // Result was recomputed by add_track while in HasResult.
        assert_eq!(session.result().len(), 2);
    }

    #[test]
    fn test_degenerate_track_matches_nothing() {
        let catalog =
            EarthquakeCatalog::from_records(vec![record(1, 5.0, 5.0, 4.0, 10.0, 2000.0)]);
        let session = QuerySession::with_settings(&catalog, DEFAULT_BOUNDARY_TOLERANCE, filters());

        let flat = Track::new(vec![
            geo::Coord { x: 0.0, y: 5.0 },
            geo::Coord { x: 5.0, y: 5.0 },
            geo::Coord { x: 10.0, y: 5.0 },
        ])
        .unwrap();
        session.add_track(flat);
        assert!(session.run_query().is_empty());
    }
}
