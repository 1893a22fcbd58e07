//! Epicenter - a spatial feature query engine for earthquake catalogs.
//!
//! Indexes a static set of earthquake point records, answers polygon
//! containment queries over user-drawn tracks, and applies compound
//! attribute-range filters to produce an ordered result set for display.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod pip;
pub mod report;
pub mod session;

pub use catalog::EarthquakeCatalog;
pub use error::QueryError;
pub use models::{EarthquakeRecord, FilterSet, RangeFilter, UnknownYearRule, SENTINEL};
pub use pip::{Track, TrackSet, DEFAULT_BOUNDARY_TOLERANCE};
pub use session::{QueryResult, QuerySession, SessionPhase};
