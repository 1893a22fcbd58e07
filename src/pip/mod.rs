//! Point-in-Polygon (PIP) selection of catalog records.
//!
//! Holds the track shapes drawn by the user and answers "which records lie
//! inside" using an R-tree spatial index with even-odd containment.

mod index;
mod track;

pub use index::RecordSpatialIndex;
pub use track::{Track, TrackSet, DEFAULT_BOUNDARY_TOLERANCE};
