use std::f64::consts::PI;

use super::coordinate::Coordinate;
use super::distance::{DEGREE_RAD, EARTH_R};
use crate::error::{ClusterError, Result};

/// Centroid is the representative center of a cluster together with the
/// radius (in kilometers) of the circle that covers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub center: Coordinate,
    /// Covering radius in kilometers
    pub radius: f64,
}

impl Centroid {
    pub fn new(center: Coordinate, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Generates a closed ring of points `radius` km away from the center
    ///
    /// Points are spaced evenly by bearing, starting due north and going
    /// clockwise. The ring has `segments + 1` entries, the last repeating the
    /// first, which is what polygon outlines in map overlays expect.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if fewer than 3 segments are requested.
    pub fn circle(&self, segments: usize) -> Result<Vec<Coordinate>> {
        if segments < 3 {
            return Err(ClusterError::InvalidParameter {
                name: "segments",
                message: "a circle needs at least 3 segments",
            });
        }

        let lat1 = self.center.latitude_rad();
        let lon1 = self.center.longitude_rad();
        let delta = self.radius / EARTH_R;

        let mut ring = Vec::with_capacity(segments + 1);
        for i in 0..segments {
            let bearing = 2.0 * PI * i as f64 / segments as f64;

            let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
            let lon2 = lon1
                + (bearing.sin() * delta.sin() * lat1.cos())
                    .atan2(delta.cos() - lat1.sin() * lat2.sin());

            // wrap into [-180, 180)
            let lon = (lon2 / DEGREE_RAD + 540.0).rem_euclid(360.0) - 180.0;
            ring.push(Coordinate::with_altitude(
                lon,
                lat2 / DEGREE_RAD,
                self.center.altitude,
            ));
        }
        ring.push(ring[0]);

        Ok(ring)
    }
}
