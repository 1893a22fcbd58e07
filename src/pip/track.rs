//! User-drawn track shapes and the containment test.

use geo::{Area, BoundingRect, Coord, LineString, Polygon};

use crate::error::QueryError;

/// Outward dilation of the track boundary when testing containment, in the
/// catalog's coordinate units. Reproduces the small within-distance
/// tolerance the original map query used instead of exact containment.
pub const DEFAULT_BOUNDARY_TOLERANCE: f64 = 0.0001;

/// A finished user-drawn polygon or rectangle in planar map coordinates.
///
/// The vertex ring is closed implicitly. Construction rejects shapes with
/// fewer than 3 vertices; a zero-area shape is accepted but matches no
/// points. Immutable once built.
#[derive(Debug, Clone)]
pub struct Track {
    polygon: Polygon<f64>,
    degenerate: bool,
}

impl Track {
    /// Build a track from an ordered vertex list.
    pub fn new(vertices: Vec<Coord<f64>>) -> Result<Self, QueryError> {
        if vertices.len() < 3 {
            return Err(QueryError::InvalidTrack {
                vertices: vertices.len(),
            });
        }

        let mut ring = vertices;
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }

        let polygon = Polygon::new(LineString::new(ring), vec![]);
        let degenerate = polygon.unsigned_area().abs() < f64::EPSILON;

        Ok(Self { polygon, degenerate })
    }

    /// Build an axis-aligned rectangle track from two corners.
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, QueryError> {
        Self::new(vec![
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: min_y },
            Coord { x: max_x, y: max_y },
            Coord { x: min_x, y: max_y },
        ])
    }

    /// Whether the track bounds no area (collinear or repeated vertices).
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Bounding box as (min_x, min_y, max_x, max_y).
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.polygon
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Even-odd containment with the boundary dilated outward by
    /// `tolerance`. A point exactly on an edge is contained for any
    /// tolerance >= 0. Degenerate tracks contain nothing.
    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        if self.degenerate {
            return false;
        }

        let ring = &self.polygon.exterior().0;
        if even_odd_inside(ring, x, y) {
            return true;
        }

        boundary_distance(ring, x, y) <= tolerance
    }
}

/// A collection of completed tracks; the effective selection shape is their
/// union, so a point is selected when any member contains it.
#[derive(Debug, Clone, Default)]
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn contains(&self, x: f64, y: f64, tolerance: f64) -> bool {
        self.tracks.iter().any(|t| t.contains(x, y, tolerance))
    }
}

/// Classic ray-casting even-odd test over a closed ring. Deterministic even
/// for self-intersecting rings.
fn even_odd_inside(ring: &[Coord<f64>], x: f64, y: f64) -> bool {
    let mut inside = false;
    for edge in ring.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        if (a.y > y) != (b.y > y) {
            let x_cross = a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x);
            if x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Minimum Euclidean distance from a point to any edge of the ring.
fn boundary_distance(ring: &[Coord<f64>], x: f64, y: f64) -> f64 {
    let mut min = f64::INFINITY;
    for edge in ring.windows(2) {
        let d = segment_distance(edge[0], edge[1], x, y);
        if d < min {
            min = d;
        }
    }
    min
}

fn segment_distance(a: Coord<f64>, b: Coord<f64>, x: f64, y: f64) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((x - a.x) * dx + (y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let (px, py) = (a.x + t * dx, a.y + t * dy);
    ((x - px) * (x - px) + (y - py) * (y - py)).sqrt()
}
