use thiserror::Error;

/// Errors surfaced by the query engine.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A track needs at least 3 vertices to bound any area.
    #[error("invalid track: {vertices} vertices, need at least 3")]
    InvalidTrack { vertices: usize },

    /// A catalog row whose coordinate fields are missing or non-numeric.
    /// Never propagated out of the loader; rows are skipped with a warning.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}
