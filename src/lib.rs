//! Spatial clustering of geographic event records.
//!
//! Coordinates are grouped either by density ([`cluster::Dbscan`]) or by
//! iterative nearest-centroid refinement ([`cluster::KMeans`]). Both work on a
//! [`cluster::CoordinateCollection`], which keeps its mean centroid current
//! across every mutation.

pub mod cluster;
pub mod error;

pub use error::{ClusterError, Result};
