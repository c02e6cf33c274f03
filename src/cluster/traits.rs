//! Clustering traits.

use super::collection::CoordinateCollection;
use crate::error::Result;

/// Trait for clustering algorithms over a coordinate collection.
pub trait Clusterer {
    /// Partitions `coordinates`, writing each member's resulting tag back in
    /// place and keeping the partition in [`Clusterer::clusters`].
    fn analyse(&mut self, coordinates: &mut CoordinateCollection) -> Result<()>;

    /// Clusters found by the last [`Clusterer::analyse`] call, indexed from 0.
    fn clusters(&self) -> &[CoordinateCollection];
}
