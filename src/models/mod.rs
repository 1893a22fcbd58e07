//! Core data models for the query engine.

pub mod filter;
pub mod record;

pub use filter::{FilterSet, RangeFilter, UnknownYearRule};
pub use record::{EarthquakeRecord, SENTINEL};
