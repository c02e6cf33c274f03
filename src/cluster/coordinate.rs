use super::distance::{DEGREE_RAD, EARTH_R};

/// Clustering state carried by every [`Coordinate`].
///
/// A fresh coordinate is `Unassigned`. DBSCAN may move it to `Noise` and later
/// absorb it into a cluster; K-Means always ends with `Cluster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterTag {
    /// Not yet visited by any clustering pass.
    #[default]
    Unassigned,
    /// Visited, but not reachable from any core point (so far).
    Noise,
    /// Member of the cluster with this 0-based index.
    Cluster(usize),
}

impl ClusterTag {
    /// Returns true once a clustering pass has visited the coordinate.
    pub fn is_classified(&self) -> bool {
        !matches!(self, ClusterTag::Unassigned)
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterTag::Noise)
    }

    /// Returns the cluster index, if any.
    pub fn cluster_id(&self) -> Option<usize> {
        match self {
            ClusterTag::Cluster(id) => Some(*id),
            _ => None,
        }
    }
}

/// Coordinate represents a geographic position in degrees.
///
/// Equality only looks at `(latitude, longitude)`: altitude and the clustering
/// tag are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinate {
    /// Longitude in degrees
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    tag: ClusterTag,
}

impl Coordinate {
    /// Creates a coordinate at ground level.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self::with_altitude(longitude, latitude, 0.0)
    }

    pub const fn with_altitude(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude,
            tag: ClusterTag::Unassigned,
        }
    }

    /// Returns false if longitude or latitude is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude * DEGREE_RAD
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude * DEGREE_RAD
    }

    /// Projects the coordinate onto a sphere of radius `EARTH_R` plus altitude.
    ///
    /// Returns `[x, y, z]` in kilometers, with the z axis through the poles and
    /// the x axis through (0, 0).
    pub fn to_cartesian(&self) -> [f64; 3] {
        let r = EARTH_R + self.altitude / 1000.0;
        let (lon, lat) = (self.longitude_rad(), self.latitude_rad());
        [
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        ]
    }

    pub fn tag(&self) -> ClusterTag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: ClusterTag) {
        self.tag = tag;
    }

    pub fn is_classified(&self) -> bool {
        self.tag.is_classified()
    }

    pub fn is_noise(&self) -> bool {
        self.tag.is_noise()
    }

    pub fn cluster_id(&self) -> Option<usize> {
        self.tag.cluster_id()
    }

    /// Returns the coordinate to its unclustered state so it can be clustered again.
    pub fn reset(&mut self) {
        self.tag = ClusterTag::Unassigned;
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

impl From<[f64; 2]> for Coordinate {
    /// Builds a coordinate from a `[longitude, latitude]` pair.
    fn from(p: [f64; 2]) -> Self {
        Coordinate::new(p[0], p[1])
    }
}

