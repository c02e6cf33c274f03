//! Spatial clustering of (lon, lat) coordinates with DBSCAN and K-Means
pub mod centroid;
pub mod collection;
pub mod coordinate;
pub mod dbscan;
pub mod distance;
pub mod kdtree;
pub mod kmeans;
pub mod traits;

#[cfg(test)]
mod dbscan_test;

pub use centroid::Centroid;
pub use collection::CoordinateCollection;
pub use coordinate::{ClusterTag, Coordinate};
pub use dbscan::{DEFAULT_MIN_POINTS, Dbscan, NeighbourSearch, region_query};
pub use distance::{
    DEGREE_RAD, EARTH_R, distance_squared, equirectangular, haversine, spherical,
};
pub use kdtree::KdTree;
pub use kmeans::{DEFAULT_MAX_ITERATIONS, KMeans, estimate_k};
pub use traits::Clusterer;
