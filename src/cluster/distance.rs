use std::f64::consts::PI;

use super::coordinate::Coordinate;

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Earth radius in kilometers
pub const EARTH_R: f64 = 6371.0;

/// Calculates great-circle distance using the haversine formula
///
/// # Returns
///
/// Distance in kilometers
pub fn haversine(c1: &Coordinate, c2: &Coordinate) -> f64 {
    let (lat1, lat2) = (c1.latitude_rad(), c2.latitude_rad());
    let d_lat = lat2 - lat1;
    let d_lon = c2.longitude_rad() - c1.longitude_rad();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    EARTH_R * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Calculates great-circle distance using the spherical law of cosines
///
/// Agrees with [`haversine`] except near antipodal points, where the
/// cosine loses precision.
///
/// # Returns
///
/// Distance in kilometers
pub fn spherical(c1: &Coordinate, c2: &Coordinate) -> f64 {
    let (lat1, lat2) = (c1.latitude_rad(), c2.latitude_rad());
    let d_lon = c2.longitude_rad() - c1.longitude_rad();

    // rounding can push the cosine just past 1 for coincident points
    let cos_c = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * d_lon.cos()).clamp(-1.0, 1.0);

    EARTH_R * cos_c.acos()
}

/// Calculates equirectangular (planar) approximation of the distance
///
/// Only accurate over short ranges, but needs a single cosine.
///
/// # Returns
///
/// Distance in kilometers
pub fn equirectangular(c1: &Coordinate, c2: &Coordinate) -> f64 {
    let v1 = (c1.latitude - c2.latitude) * DEGREE_RAD;
    let v1 = v1 * v1;

    let v2 = (c1.longitude - c2.longitude)
        * DEGREE_RAD
        * ((c1.latitude + c2.latitude) / 2.0 * DEGREE_RAD).cos();
    let v2 = v2 * v2;

    EARTH_R * (v1 + v2).sqrt()
}

/// Calculates squared planar distance on raw degrees
///
/// No radian conversion and no Earth-radius scaling: the result is in
/// degree² and is what DBSCAN compares its epsilon against. Not a
/// geographic distance.
pub fn distance_squared(c1: &Coordinate, c2: &Coordinate) -> f64 {
    let v1 = c1.latitude - c2.latitude;
    let v2 = c1.longitude - c2.longitude;

    v1 * v1 + v2 * v2
}
