use super::centroid::Centroid;
use super::coordinate::{ClusterTag, Coordinate};
use super::distance::haversine;
use crate::error::{ClusterError, Result};

/// CoordinateCollection is an ordered list of coordinates with a live centroid
///
/// The centroid is the arithmetic mean of member longitudes and latitudes
/// (altitude excluded) and is recomputed after every membership change.
/// Duplicates are allowed.
#[derive(Debug, Clone, Default)]
pub struct CoordinateCollection {
    coordinates: Vec<Coordinate>,
    /// Last computed mean; stale only while the collection is empty.
    centroid: Coordinate,
}

impl CoordinateCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Coordinate> {
        self.coordinates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.coordinates.iter()
    }

    pub fn as_slice(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Returns the mean position of the members
    ///
    /// # Errors
    ///
    /// - `EmptyCollection` if there are no members to average.
    /// - `NonFiniteCoordinate` if a member is NaN or infinite.
    pub fn centroid(&self) -> Result<Coordinate> {
        if self.coordinates.is_empty() {
            return Err(ClusterError::EmptyCollection);
        }
        if !self.centroid.is_finite() {
            self.check_finite()?;
            return Err(ClusterError::InvalidParameter {
                name: "coordinates",
                message: "mean position overflows",
            });
        }
        Ok(self.centroid)
    }

    /// Fails with `NonFiniteCoordinate` naming the first member whose
    /// longitude or latitude is NaN or infinite.
    pub fn check_finite(&self) -> Result<()> {
        match self.coordinates.iter().position(|c| !c.is_finite()) {
            Some(index) => Err(ClusterError::NonFiniteCoordinate { index }),
            None => Ok(()),
        }
    }

    /// Appends a coordinate and recomputes the centroid.
    pub fn add(&mut self, coordinate: Coordinate) {
        self.coordinates.push(coordinate);
        self.update_centroid();
    }

    /// Removes the first member equal to `coordinate`
    ///
    /// Returns false if no member matched.
    pub fn remove(&mut self, coordinate: &Coordinate) -> bool {
        match self.coordinates.iter().position(|c| c == coordinate) {
            Some(i) => {
                self.coordinates.remove(i);
                self.update_centroid();
                true
            }
            None => false,
        }
    }

    /// Removes and returns the member at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Coordinate> {
        if index >= self.coordinates.len() {
            return Err(ClusterError::IndexOutOfBounds {
                index,
                len: self.coordinates.len(),
            });
        }
        let removed = self.coordinates.remove(index);
        self.update_centroid();
        Ok(removed)
    }

    /// Overwrites the clustering tag of one member. Positions are untouched, so
    /// the centroid stays valid.
    pub fn set_tag(&mut self, index: usize, tag: ClusterTag) -> Result<()> {
        let len = self.coordinates.len();
        let c = self
            .coordinates
            .get_mut(index)
            .ok_or(ClusterError::IndexOutOfBounds { index, len })?;
        c.set_tag(tag);
        Ok(())
    }

    /// Labels every member as part of cluster `id`, clearing any noise mark.
    pub fn update_all_cluster_id(&mut self, id: usize) {
        for c in &mut self.coordinates {
            c.set_tag(ClusterTag::Cluster(id));
        }
    }

    /// Puts every member back into the unclustered state.
    pub fn reset_tags(&mut self) {
        for c in &mut self.coordinates {
            c.reset();
        }
    }

    /// Splits the collection into `parts` contiguous chunks in member order
    ///
    /// Chunk size is `ceil(len / parts)`, so the trailing chunks may be
    /// shorter, or empty when `len` does not fill every chunk. Exactly
    /// `parts` collections are returned.
    ///
    /// # Errors
    ///
    /// `InvalidSplit` if `parts` is zero or greater than the member count.
    /// An empty collection may still be split into one empty part.
    pub fn split(&self, parts: usize) -> Result<Vec<CoordinateCollection>> {
        let len = self.coordinates.len();
        if parts == 0 || parts > len.max(1) {
            return Err(ClusterError::InvalidSplit { parts, len });
        }

        let chunk = len.div_ceil(parts);

        Ok((0..parts)
            .map(|i| {
                let start = (i * chunk).min(len);
                let end = (start + chunk).min(len);
                self.coordinates[start..end].iter().copied().collect()
            })
            .collect())
    }

    /// Calculates the bounding box of the members
    ///
    /// Returns `(min, max)` where:
    /// - `min` is the minimum corner (bottom-left)
    /// - `max` is the maximum corner (top-right)
    pub fn bounds(&self) -> Result<(Coordinate, Coordinate)> {
        if self.coordinates.is_empty() {
            return Err(ClusterError::EmptyCollection);
        }

        let mut min = Coordinate::new(180.0, 90.0);
        let mut max = Coordinate::new(-180.0, -90.0);

        for c in &self.coordinates {
            min.longitude = min.longitude.min(c.longitude);
            min.latitude = min.latitude.min(c.latitude);
            max.longitude = max.longitude.max(c.longitude);
            max.latitude = max.latitude.max(c.latitude);
        }

        Ok((min, max))
    }

    /// Returns the centroid together with the haversine distance (km) to the
    /// farthest member.
    pub fn covering_centroid(&self) -> Result<Centroid> {
        let center = self.centroid()?;
        let radius = self
            .coordinates
            .iter()
            .map(|c| haversine(&center, c))
            .fold(0.0, f64::max);

        Ok(Centroid::new(center, radius))
    }

    fn update_centroid(&mut self) {
        if self.coordinates.is_empty() {
            return;
        }

        let n = self.coordinates.len() as f64;
        let (lon, lat) = self
            .coordinates
            .iter()
            .fold((0.0, 0.0), |(lon, lat), c| (lon + c.longitude, lat + c.latitude));

        self.centroid = Coordinate::new(lon / n, lat / n);
    }
}

impl From<Vec<Coordinate>> for CoordinateCollection {
    fn from(coordinates: Vec<Coordinate>) -> Self {
        let mut collection = Self {
            coordinates,
            centroid: Coordinate::default(),
        };
        collection.update_centroid();
        collection
    }
}

impl FromIterator<Coordinate> for CoordinateCollection {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a CoordinateCollection {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.coordinates.iter()
    }
}
