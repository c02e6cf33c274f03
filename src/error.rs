use thiserror::Error;

/// Result alias for clustering operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors raised by the clustering engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// A collection was asked to split into zero parts, or into more parts
    /// than it has members.
    #[error("cannot split a collection of length {len} into {parts} parts")]
    InvalidSplit { parts: usize, len: usize },

    /// A mean-dependent value was requested from an empty collection.
    #[error("collection is empty")]
    EmptyCollection,

    /// Positional access past the end of a collection.
    #[error("index {index} is out of bounds for collection of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// K-Means cannot produce the requested number of clusters.
    #[error("cannot create {requested} clusters from {items} coordinates")]
    InvalidClusterCount { requested: usize, items: usize },

    /// A member coordinate has a NaN or infinite longitude or latitude.
    #[error("coordinate {index} has a non-finite longitude or latitude")]
    NonFiniteCoordinate { index: usize },

    /// A clustering parameter is outside its domain.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },

    /// K-Means kept moving coordinates past its iteration ceiling.
    #[error("k-means did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
}
