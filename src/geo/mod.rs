//! Great-circle distance filtering.
//!
//! Distances use the haversine formula on a spherical-earth approximation,
//! which is accurate to well under a percent at the radii this service
//! cares about.

/// Mean earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two (latitude, longitude)
/// coordinates given in degrees.
pub fn distance_meters(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = (lat_b - lat_a).to_radians();
    let d_lambda = (lon_b - lon_a).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Whether `point` lies within `radius_meters` of `origin`. The threshold
/// is inclusive: a point at exactly the radius is in range.
pub fn within_radius(
    origin_lat: f64,
    origin_lon: f64,
    point_lat: f64,
    point_lon: f64,
    radius_meters: f64,
) -> bool {
    distance_meters(origin_lat, origin_lon, point_lat, point_lon) <= radius_meters
}
